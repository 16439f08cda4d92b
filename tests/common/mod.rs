//! Shared helpers: a recording stand-in for the external tools and a
//! multipart body builder.

#![allow(dead_code)]

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use trusted_merge::config::Config;
use trusted_merge::error::CommandError;
use trusted_merge::services::{CommandOutput, CommandRunner};
use trusted_merge::{create_router, AppState};

#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum Failure {
    Exit,
    Timeout,
    /// Never returns, like a tool wedged on its input.
    Hang,
}

/// Pretends to be pdfinfo / gs / img2pdf / enscript / ps2pdf / pdfunite.
///
/// Outputs are small text files so tests can read back what was merged:
/// the fake `pdfunite` writes its inputs' contents joined by `|`.
#[derive(Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<Invocation>>,
    failures: Mutex<HashMap<String, Failure>>,
    pdfinfo_stdout: Mutex<Option<String>>,
}

impl FakeRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail(&self, program: &str, failure: Failure) {
        self.failures
            .lock()
            .unwrap()
            .insert(program.to_string(), failure);
    }

    pub fn set_pdfinfo_stdout(&self, stdout: &str) {
        *self.pdfinfo_stdout.lock().unwrap() = Some(stdout.to_string());
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.program).collect()
    }

    pub fn last_call(&self, program: &str) -> Option<Invocation> {
        self.calls().into_iter().rev().find(|c| c.program == program)
    }
}

fn value_after(args: &[String], flag: &str) -> Option<PathBuf> {
    let index = args.iter().position(|a| a == flag)?;
    args.get(index + 1).map(PathBuf::from)
}

fn write(path: &Path, content: &[u8]) -> Result<(), CommandError> {
    std::fs::write(path, content).map_err(|source| CommandError::Io {
        program: "fake".to_string(),
        source,
    })
}

fn converted(program: &str, input: &Path) -> Vec<u8> {
    let mut content = format!("{program}:").into_bytes();
    content.extend(std::fs::read(input).unwrap_or_default());
    content
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, CommandError> {
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        self.calls.lock().unwrap().push(Invocation {
            program: program.to_string(),
            args: args.clone(),
        });

        let failure = self.failures.lock().unwrap().get(program).cloned();
        if let Some(failure) = failure {
            return Err(match failure {
                Failure::Exit => CommandError::Failed {
                    program: program.to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: format!("{program} exploded at /secret/path"),
                },
                Failure::Timeout => CommandError::Timeout {
                    program: program.to_string(),
                    timeout: Duration::from_secs(120),
                },
                Failure::Hang => return std::future::pending().await,
            });
        }

        let mut stdout = String::new();
        match program {
            "pdfinfo" => {
                stdout = self
                    .pdfinfo_stdout
                    .lock()
                    .unwrap()
                    .clone()
                    .unwrap_or_else(|| "Pages: 1\nPage size:      612 x 792 pts (letter)\n".to_string());
            }
            "img2pdf" | "enscript" | "gs" => {
                let output = value_after(&args, "-o").expect("output flag");
                let content = match program {
                    "gs" => b"BLANK".to_vec(),
                    "img2pdf" => converted(program, Path::new(&args[0])),
                    // enscript takes its input last
                    _ => converted(program, Path::new(args.last().unwrap())),
                };
                write(&output, &content)?;
            }
            "ps2pdf" => {
                write(Path::new(&args[1]), &converted(program, Path::new(&args[0])))?;
            }
            "pdfunite" => {
                let (output, inputs) = args.split_last().expect("pdfunite args");
                let parts: Vec<Vec<u8>> = inputs
                    .iter()
                    .map(|p| std::fs::read(p).unwrap_or_default())
                    .collect();
                write(Path::new(output), &parts.join(&b'|'))?;
            }
            other => panic!("unexpected command: {other}"),
        }

        Ok(CommandOutput { stdout })
    }
}

pub struct TestApp {
    pub router: Router,
    pub runner: Arc<FakeRunner>,
    pub temp_root: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_runner(FakeRunner::new())
    }

    pub fn with_runner(runner: Arc<FakeRunner>) -> Self {
        let temp_root = tempfile::tempdir().unwrap();
        let config = Config {
            temp_root: temp_root.path().to_path_buf(),
            max_upload_size_mb: 8,
            ..Config::default()
        };
        let router = create_router(AppState::new(config, runner.clone()));
        Self {
            router,
            runner,
            temp_root,
        }
    }

    /// Anything left under the temp root once a request has finished.
    pub fn leftovers(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.temp_root.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }

    pub async fn post(&self, form: MultipartForm) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri("/api/merge")
            .header(header::CONTENT_TYPE, form.content_type())
            .body(Body::from(form.finish()))
            .unwrap();
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024 * 1024)
            .await
            .unwrap()
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn error_message(&self) -> String {
        let value: serde_json::Value = serde_json::from_slice(&self.body).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1, "error body must only carry `error`");
        object["error"].as_str().unwrap().to_string()
    }

    pub fn header(&self, name: header::HeaderName) -> String {
        self.headers
            .get(name)
            .map(|v| v.to_str().unwrap().to_string())
            .unwrap_or_default()
    }
}

const BOUNDARY: &str = "----trusted-merge-test-boundary";

#[derive(Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .into_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content: &[u8]) -> Self {
        self.body.extend(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .into_bytes(),
        );
        self.body.extend_from_slice(content);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend(format!("--{BOUNDARY}--\r\n").into_bytes());
        self.body
    }
}

pub fn fake_pdf(label: &str) -> Vec<u8> {
    format!("%PDF-1.4 {label}").into_bytes()
}
