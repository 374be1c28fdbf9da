//! Normalization of the submitted image set.
//!
//! Images arrive as inline `data:image/...;base64,` URLs (or absolute http(s)
//! URLs for imported listings) and are stored in the listing row as-is.

use base64::Engine;

use crate::error::ErrorCode;
use crate::models::Images;

pub const MAX_IMAGES: usize = 8;

/// Trims and caps the uploads, then moves `cover` to the front.
///
/// A cover that matches none of the uploads is ignored rather than added:
/// the marker only selects among images that were actually submitted.
pub fn normalize(uploaded: &[String], cover: Option<&str>, max_bytes: usize) -> Result<Images, ErrorCode> {
    let mut images: Vec<String> = uploaded
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .take(MAX_IMAGES)
        .map(str::to_string)
        .collect();

    for image in &images {
        validate(image, max_bytes)?;
    }

    if let Some(cover) = cover.map(str::trim).filter(|c| !c.is_empty()) {
        match images.iter().position(|image| image == cover) {
            Some(index) if index > 0 => {
                let selected = images.remove(index);
                images.insert(0, selected);
            }
            Some(_) => {}
            None => tracing::debug!("Cover marker matches no uploaded image, ignoring"),
        }
    }

    Ok(Images(images))
}

fn validate(image: &str, max_bytes: usize) -> Result<(), ErrorCode> {
    if image.starts_with("https://") || image.starts_with("http://") {
        return Ok(());
    }

    let payload = image
        .strip_prefix("data:image/")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .ok_or(ErrorCode::Invalid)?;

    // Cheap upper bound before decoding.
    if payload.len() / 4 * 3 > max_bytes + 3 {
        return Err(ErrorCode::Invalid);
    }

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|_| ErrorCode::Invalid)?;

    if decoded.is_empty() || decoded.len() > max_bytes {
        return Err(ErrorCode::Invalid);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 1024;

    fn data_url(tag: u8) -> String {
        let bytes = [tag; 16];
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(bytes)
        )
    }

    fn urls(tags: &[u8]) -> Vec<String> {
        tags.iter().copied().map(data_url).collect()
    }

    #[test]
    fn keeps_order_without_cover() {
        let uploaded = urls(&[1, 2, 3]);
        let images = normalize(&uploaded, None, LIMIT).unwrap();
        assert_eq!(images.0, uploaded);
    }

    #[test]
    fn drops_blank_entries_and_caps_at_eight() {
        let mut uploaded = vec!["   ".to_string(), String::new()];
        uploaded.extend(urls(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]));
        let images = normalize(&uploaded, None, LIMIT).unwrap();
        assert_eq!(images.len(), MAX_IMAGES);
        assert_eq!(images[0], data_url(1));
        assert_eq!(images[7], data_url(8));
    }

    #[test]
    fn cover_moves_to_front() {
        let uploaded = urls(&[1, 2, 3]);
        let images = normalize(&uploaded, Some(&data_url(3)), LIMIT).unwrap();
        assert_eq!(images.0, urls(&[3, 1, 2]));
    }

    #[test]
    fn cover_already_first_is_a_no_op() {
        let uploaded = urls(&[1, 2]);
        let images = normalize(&uploaded, Some(&data_url(1)), LIMIT).unwrap();
        assert_eq!(images.0, uploaded);
    }

    #[test]
    fn unknown_cover_is_not_prepended() {
        let uploaded = urls(&[1, 2]);
        let images = normalize(&uploaded, Some("https://elsewhere.example/car.jpg"), LIMIT).unwrap();
        assert_eq!(images.0, uploaded);
        assert_eq!(images.len(), 2);
    }

    #[test]
    fn cover_beyond_the_cap_is_ignored() {
        let uploaded = urls(&[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        let images = normalize(&uploaded, Some(&data_url(9)), LIMIT).unwrap();
        assert_eq!(images[0], data_url(1));
        assert!(!images.contains(&data_url(9)));
    }

    #[test]
    fn empty_upload_yields_no_images() {
        let images = normalize(&[], Some("data:image/png;base64,AAAA"), LIMIT).unwrap();
        assert!(images.is_empty());
    }

    #[test]
    fn rejects_non_image_references() {
        for bad in [
            "javascript:alert(1)",
            "data:text/html;base64,PGI+",
            "data:image/png,raw",
            "data:image/png;base64,!!!notbase64",
            "data:image/png;base64,",
            "/relative/path.png",
        ] {
            assert_eq!(normalize(&[bad.to_string()], None, LIMIT), Err(ErrorCode::Invalid), "{bad}");
        }
    }

    #[test]
    fn rejects_oversized_images() {
        let big = format!(
            "data:image/jpeg;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(vec![0u8; LIMIT + 1])
        );
        assert_eq!(normalize(&[big], None, LIMIT), Err(ErrorCode::Invalid));
    }

    #[test]
    fn accepts_absolute_urls() {
        let uploaded = vec!["https://images.example/car.jpg".to_string()];
        assert!(normalize(&uploaded, None, LIMIT).is_ok());
    }
}
