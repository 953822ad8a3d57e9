//! In-memory stand-ins for the network, git and `go` used by unit tests.

use std::{cell::RefCell, collections::HashMap, path::Path};

use crate::{
    git::{ref_matches, GitError, RefLister, RemoteRef},
    gomod::{CommandError, CommandRunner},
    http::{HttpError, HttpFetcher, HttpResponse},
};

/// Serves canned responses by URL; anything else is a 404.
#[derive(Default)]
pub struct FakeHttp {
    responses: HashMap<String, HttpResponse>,
    requests: RefCell<Vec<String>>,
}

impl FakeHttp {
    pub fn with(mut self, url: &str, status: u16, body: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            HttpResponse {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl HttpFetcher for FakeHttp {
    fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        self.requests.borrow_mut().push(url.to_string());
        Ok(self.responses.get(url).cloned().unwrap_or(HttpResponse {
            status: 404,
            body: "404: Not Found".to_string(),
        }))
    }
}

#[derive(Default)]
pub struct FakeRefs {
    refs: HashMap<String, Vec<RemoteRef>>,
    requests: RefCell<Vec<(String, String)>>,
}

impl FakeRefs {
    pub fn with(mut self, url: &str, refs: Vec<RemoteRef>) -> Self {
        self.refs.insert(url.to_string(), refs);
        self
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.borrow().clone()
    }
}

impl RefLister for FakeRefs {
    fn list_refs(&self, url: &str, pattern: &str) -> Result<Vec<RemoteRef>, GitError> {
        self.requests
            .borrow_mut()
            .push((url.to_string(), pattern.to_string()));
        Ok(self
            .refs
            .get(url)
            .into_iter()
            .flatten()
            .filter(|remote_ref| ref_matches(&remote_ref.name, pattern))
            .cloned()
            .collect())
    }
}

/// Plays the `go` command against an in-memory `go mod edit -json` document.
/// A successful `go get pkg@version` updates the matching requirement.
pub struct FakeRunner {
    mod_json: RefCell<String>,
    output_error: Option<String>,
    run_errors: Vec<(String, String)>,
    calls: RefCell<Vec<String>>,
}

impl FakeRunner {
    pub fn with_output(mod_json: &str) -> Self {
        FakeRunner {
            mod_json: RefCell::new(mod_json.to_string()),
            output_error: None,
            run_errors: Vec::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_output_error(message: &str) -> Self {
        FakeRunner {
            output_error: Some(message.to_string()),
            ..FakeRunner::with_output("")
        }
    }

    /// Fails every `run`.
    pub fn with_run_error(self, message: &str) -> Self {
        self.with_run_error_on("", message)
    }

    /// Fails the `run` calls whose arguments start with `command`, e.g. `mod tidy`.
    pub fn with_run_error_on(mut self, command: &str, message: &str) -> Self {
        self.run_errors
            .push((command.to_string(), message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn mod_json(&self) -> String {
        self.mod_json.borrow().clone()
    }

    fn apply_get(&self, target: &str) {
        let Some((package, version)) = target.split_once('@') else {
            return;
        };
        let mut document: serde_json::Value = match serde_json::from_str(&self.mod_json.borrow()) {
            Ok(document) => document,
            Err(_) => return,
        };
        if let Some(requirements) = document["Require"].as_array_mut() {
            for requirement in requirements {
                if requirement["Path"] == package {
                    requirement["Version"] = serde_json::Value::from(version);
                }
            }
        }
        *self.mod_json.borrow_mut() = document.to_string();
    }
}

impl CommandRunner for FakeRunner {
    fn output(&self, _dir: &Path, args: &[&str]) -> Result<Vec<u8>, CommandError> {
        self.calls.borrow_mut().push(args.join(" "));
        match &self.output_error {
            Some(message) => Err(CommandError::Other(message.clone())),
            None => Ok(self.mod_json.borrow().as_bytes().to_vec()),
        }
    }

    fn run(&self, _dir: &Path, args: &[&str]) -> Result<(), CommandError> {
        let call = args.join(" ");
        self.calls.borrow_mut().push(call.clone());
        if let Some((_, message)) = self
            .run_errors
            .iter()
            .find(|(command, _)| call.starts_with(command.as_str()))
        {
            return Err(CommandError::Other(message.clone()));
        }
        if let ["get", target] = args {
            self.apply_get(target);
        }
        Ok(())
    }
}
