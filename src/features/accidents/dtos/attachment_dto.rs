use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum AttachmentKind {
    RegistrationImage,
    SceneImage,
}

/// A file received with the accident form, before upload
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    pub kind: AttachmentKind,
    pub file_name: Option<String>,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// An attachment that was not stored; the report is created regardless
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentFailure {
    pub kind: AttachmentKind,
    /// Position among attachments of the same kind, in submission order
    pub index: usize,
    pub file_name: Option<String>,
    pub reason: String,
}
