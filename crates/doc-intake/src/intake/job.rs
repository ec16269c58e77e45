use serde::Serialize;

/// Client and version identifiers for the current session, as entered by the operator.
/// Blank values count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobContext {
    client_id: Option<String>,
    version_id: Option<String>,
}

impl JobContext {
    pub fn new(client_id: Option<String>, version_id: Option<String>) -> Self {
        let mut context = Self::default();
        context.set_client_id(client_id);
        context.set_version_id(version_id);
        context
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn version_id(&self) -> Option<&str> {
        self.version_id.as_deref()
    }

    pub fn set_client_id(&mut self, value: Option<String>) {
        self.client_id = normalize(value);
    }

    pub fn set_version_id(&mut self, value: Option<String>) {
        self.version_id = normalize(value);
    }

    /// Both identifiers, or the first one still missing (client before version).
    pub fn require(&self) -> Result<JobCredentials, MissingContext> {
        let client_id = self.client_id.clone().ok_or(MissingContext::ClientId)?;
        let version_id = self.version_id.clone().ok_or(MissingContext::VersionId)?;
        Ok(JobCredentials {
            client_id,
            version_id,
        })
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

/// Resolved identifiers handed to every operation that talks to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobCredentials {
    #[serde(rename = "clientID")]
    pub client_id: String,
    #[serde(rename = "versionID")]
    pub version_id: String,
}

impl JobCredentials {
    pub fn new(client_id: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            version_id: version_id.into(),
        }
    }
}

/// The operator still has to supply one of the job identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MissingContext {
    #[error("Please enter a client ID")]
    ClientId,
    #[error("Please enter a version ID")]
    VersionId,
}

impl MissingContext {
    pub fn prompt(self) -> &'static str {
        match self {
            MissingContext::ClientId => "Please enter a client ID",
            MissingContext::VersionId => "Please enter a version ID",
        }
    }
}
