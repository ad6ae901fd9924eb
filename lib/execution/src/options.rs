use rdf_update_acl::ADMIN_USER;
use serde::{Deserialize, Serialize};

/// Options for update execution.
///
/// ```
/// use rdf_update_execution::UpdateOptions;
///
/// let options: UpdateOptions = serde_json::from_str(r#"{ "default_user": "alice" }"#)?;
/// assert_eq!(options.default_user, "alice");
/// assert!(options.track_changes);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateOptions {
    /// The user that executes a batch if the caller does not name one.
    pub default_user: String,
    /// Whether results list the changed quads. Without tracking, every list of the results is
    /// absent.
    pub track_changes: bool,
    /// The base IRI used to resolve relative IRIs of update text.
    pub base_iri: Option<String>,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            default_user: ADMIN_USER.to_owned(),
            track_changes: true,
            base_iri: None,
        }
    }
}
