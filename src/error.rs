pub type TeamcardResult<T> = Result<T, TeamcardError>;

#[derive(thiserror::Error, Debug)]
pub enum TeamcardError {
    #[error("invalid color format: {0}")]
    InvalidColorFormat(String),

    #[error("template not loaded: {0}")]
    TemplateNotLoaded(String),

    #[error("template error: {0}")]
    Template(String),

    #[error("overlay fetch failed: {0}")]
    OverlayFetchFailed(String),

    #[error("record generation failed: {0}")]
    RecordGenerationFailed(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TeamcardError {
    pub fn invalid_color(msg: impl Into<String>) -> Self {
        Self::InvalidColorFormat(msg.into())
    }

    pub fn template_not_loaded(msg: impl Into<String>) -> Self {
        Self::TemplateNotLoaded(msg.into())
    }

    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template(msg.into())
    }

    pub fn overlay(msg: impl Into<String>) -> Self {
        Self::OverlayFetchFailed(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::RecordGenerationFailed(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
