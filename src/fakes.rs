//! Hand-written fakes for the trait seams, shared by unit tests.

use crate::command::{CommandOutput, CommandRunner};
use crate::error::Result;
use crate::github::{ApiFailure, PullRequestApi, PullRequestRequest};
use crate::rate_limit::Sleeper;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// One recorded invocation.
#[derive(Debug, Clone)]
pub struct Call {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Call {
    /// The git subcommand, e.g. `push`.
    pub fn subcommand(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or("")
    }
}

/// Records every command and replays scripted outputs per git subcommand.
///
/// Subcommands without a scripted output succeed with empty output. A
/// successful `clone` writes the seeded files into the clone target so that
/// the workspace looks like a real checkout.
#[derive(Default)]
pub struct FakeRunner {
    calls: RefCell<Vec<Call>>,
    responses: RefCell<HashMap<String, VecDeque<CommandOutput>>>,
    seed: Vec<(String, String)>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an output for the next call of `subcommand`.
    pub fn respond(self, subcommand: &str, output: CommandOutput) -> Self {
        self.responses
            .borrow_mut()
            .entry(subcommand.to_string())
            .or_default()
            .push_back(output);
        self
    }

    /// File written into every successful clone target.
    pub fn seed_file(mut self, path: &str, content: &str) -> Self {
        self.seed.push((path.to_string(), content.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn subcommands(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|c| c.subcommand().to_string())
            .collect()
    }

    pub fn count(&self, subcommand: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.subcommand() == subcommand)
            .count()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CommandOutput> {
        let call = Call {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            cwd: cwd.map(Path::to_path_buf),
        };
        let subcommand = call.subcommand().to_string();
        self.calls.borrow_mut().push(call);

        let output = self
            .responses
            .borrow_mut()
            .get_mut(&subcommand)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| CommandOutput::success(""));

        if subcommand == "clone" && output.is_success() {
            if let Some(target) = args.last() {
                for (path, content) in &self.seed {
                    let full = Path::new(target).join(path);
                    if let Some(parent) = full.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(full, content)?;
                }
            }
        }

        Ok(output)
    }
}

/// Replays scripted pull request responses, succeeding once they run out.
#[derive(Default)]
pub struct FakeApi {
    responses: RefCell<VecDeque<std::result::Result<(), ApiFailure>>>,
    requests: RefCell<Vec<PullRequestRequest>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: std::result::Result<(), ApiFailure>) -> Self {
        self.responses.borrow_mut().push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<PullRequestRequest> {
        self.requests.borrow().clone()
    }
}

impl PullRequestApi for FakeApi {
    fn create_pull_request(
        &self,
        request: &PullRequestRequest,
    ) -> std::result::Result<(), ApiFailure> {
        self.requests.borrow_mut().push(request.clone());
        self.responses.borrow_mut().pop_front().unwrap_or(Ok(()))
    }
}

/// Records requested sleeps instead of sleeping.
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
    }
}

/// Local HTTP/1.1 server answering every request with one canned response.
///
/// Raw requests (head and body) are recorded before the response is written.
pub struct StubServer {
    url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub fn start(status: u16, headers: &[(&str, &str)], body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let response = canned_response(status, headers, body);
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let request = read_request(&mut stream);
                recorded.lock().unwrap().push(request);
                let _ = stream.write_all(response.as_bytes());
            }
        });

        Self { url, requests }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn canned_response(status: u16, headers: &[(&str, &str)], body: &str) -> String {
    let mut response = format!("HTTP/1.1 {} Stub\r\n", status);
    for (name, value) in headers {
        response.push_str(&format!("{}: {}\r\n", name, value));
    }
    response.push_str("Content-Type: application/json\r\n");
    response.push_str(&format!("Content-Length: {}\r\n", body.len()));
    response.push_str("Connection: close\r\n\r\n");
    response.push_str(body);
    response
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut request = String::new();
    let mut content_length = 0;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap_or(0);
        }
        request.push_str(&line);
        if line == "\r\n" {
            break;
        }
    }
    let mut body = vec![0; content_length];
    let _ = reader.read_exact(&mut body);
    request.push_str(&String::from_utf8_lossy(&body));
    request
}
