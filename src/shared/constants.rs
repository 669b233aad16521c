/// Scene photos kept per report; extra uploads are dropped in submission order
pub const MAX_SCENE_IMAGES: usize = 4;

/// Maximum size of a single attachment (10MB)
pub const MAX_ATTACHMENT_SIZE: usize = 10 * 1024 * 1024;

/// Body limit for the accident form: a registration photo, the kept scene
/// photos and two extra photos that get skipped, plus 1MB for text fields and
/// multipart framing
pub const MAX_FORM_BODY_SIZE: usize = (MAX_SCENE_IMAGES + 3) * MAX_ATTACHMENT_SIZE + 1024 * 1024;

/// Image types accepted for report attachments
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/heic",
];

/// Address shown when reverse geocoding yields nothing
pub const ADDRESS_PLACEHOLDER: &str = "Address not available";

/// Minimum digits for a phone number when no regional rule is configured
pub const MIN_PHONE_DIGITS: usize = 7;

/// Maximum digits in an E.164 number
pub const MAX_PHONE_DIGITS: usize = 15;

/// Get file extension from an image content type
pub fn extension_for_content_type(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/heic" => "heic",
        _ => "bin",
    }
}

/// Check if a content type is an accepted attachment image
pub fn is_image_type_allowed(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_body_limit_fits_full_size_photos() {
        let kept = (1 + MAX_SCENE_IMAGES) * MAX_ATTACHMENT_SIZE;
        assert!(MAX_FORM_BODY_SIZE > kept);
        assert!(MAX_FORM_BODY_SIZE - kept >= MAX_ATTACHMENT_SIZE);
    }
}
