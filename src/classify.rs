use crate::error::{FetchError, MissingTextureError};
use crate::resource::file_name;

pub const RETRIEVE_MESSAGE: &str =
    "Unable to retrieve this file. Check the log output for the network or file system error.";

/// Turns a load failure into the message shown to the user.
///
/// Checked in order: transport, parse, missing texture, anything else.
pub fn classify(error: &anyhow::Error) -> String {
    let message = error.to_string();

    if is_transport_error(error) {
        return RETRIEVE_MESSAGE.to_string();
    }

    if is_parse_error(error) || message.contains("Unexpected token") {
        return format!(
            "Unable to parse file content. Verify that this file is valid. Error: \"{message}\""
        );
    }

    if let Some(texture_error) = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<MissingTextureError>())
    {
        return format!("Missing texture: {}", file_name(&texture_error.source));
    }

    message
}

fn is_transport_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| cause.is::<FetchError>())
}

fn is_parse_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        if cause.is::<serde_json::Error>() {
            return true;
        }

        matches!(
            cause.downcast_ref::<gltf::Error>(),
            Some(gltf::Error::Deserialize(_)) | Some(gltf::Error::Binary(_))
        )
    })
}
