use serde::{Deserialize, Serialize};

// --- Data Structures ---

/// A forum thread as returned by `GET /thread/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub title: String,
    pub text: String,
    pub hash: String,
    pub created: String,
    pub modified: String,
    #[serde(default)]
    pub replies: Vec<Reply>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub hash: String,
    pub text: String,
    #[serde(default)]
    pub created: Option<String>,
}

/// Result of a thread fetch. The server discriminates on `ok`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawResponse<Thread>")]
pub enum ThreadResponse {
    Ok(Thread),
    Err(String),
}

/// Result of a reply submission.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawResponse<serde_json::Value>")]
pub enum PostResponse {
    Ok,
    Err(String),
}

#[derive(Deserialize)]
struct RawResponse<T> {
    ok: bool,
    #[serde(alias = "thread")]
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

impl TryFrom<RawResponse<Thread>> for ThreadResponse {
    type Error = String;

    fn try_from(raw: RawResponse<Thread>) -> Result<Self, Self::Error> {
        match (raw.ok, raw.data, raw.error) {
            (true, Some(thread), _) => Ok(ThreadResponse::Ok(thread)),
            (true, None, _) => Err("response is ok but carries no thread".to_string()),
            (false, _, Some(error)) => Ok(ThreadResponse::Err(error)),
            (false, _, None) => Err("response is not ok but carries no error".to_string()),
        }
    }
}

impl TryFrom<RawResponse<serde_json::Value>> for PostResponse {
    type Error = String;

    fn try_from(raw: RawResponse<serde_json::Value>) -> Result<Self, Self::Error> {
        match (raw.ok, raw.error) {
            (true, _) => Ok(PostResponse::Ok),
            (false, Some(error)) => Ok(PostResponse::Err(error)),
            (false, None) => Err("response is not ok but carries no error".to_string()),
        }
    }
}

impl ThreadResponse {
    pub fn thread(&self) -> Option<&Thread> {
        match self {
            ThreadResponse::Ok(thread) => Some(thread),
            ThreadResponse::Err(_) => None,
        }
    }
}

impl Thread {
    /// Distinct reply authors, most recent first.
    pub fn recent_authors(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.replies
            .iter()
            .rev()
            .map(|r| r.hash.as_str())
            .filter(|hash| seen.insert(*hash))
            .collect()
    }
}

/// A locally stored bookmark for a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub id: u64,
    pub created: String,
    pub title: String,
    pub hash: String,
}

impl Pin {
    pub fn from_thread(id: u64, thread: &Thread) -> Self {
        Self {
            id,
            created: thread.created.clone(),
            title: thread.title.clone(),
            hash: thread.hash.clone(),
        }
    }
}
