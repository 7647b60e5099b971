//! Image Upload Handler
//!
//! Handles image uploads from authenticated users.
//! Supports multiple image formats (PNG, JPEG, WebP) and converts to JPG.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use image::DynamicImage;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path as FsPath, PathBuf};
use std::{fs, io::Cursor};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::{AppError, AppResult};

/// Maximum file size (5MB)
const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Supported image formats
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// 上传分类白名单，决定落盘子目录
const CATEGORIES: &[&str] = &["avatar", "service", "combo", "post", "document"];

/// JPEG quality (85% - keeps photos appealing while controlling file size)
const JPEG_QUALITY: u8 = 85;

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_id: String,
    pub filename: String,
    pub original_name: String,
    pub size: usize,
    pub url: String,
}

/// Calculate SHA256 hash of data
fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Find existing file by content hash
fn find_file_by_hash(category_dir: &FsPath, hash: &str) -> Option<String> {
    let hash_dir = category_dir.join("by_hash");
    if !hash_dir.exists() {
        return None;
    }

    // Hash directory uses first 2 chars as subdir (e.g., "ab/abc123...")
    let prefix = &hash[..2];
    let hash_path = hash_dir.join(format!("{}/{}", prefix, hash));

    if hash_path.exists() {
        // Read the symlink to get original filename
        if let Ok(target) = fs::read_link(&hash_path) {
            return target.file_name().map(|s| s.to_string_lossy().to_string());
        }
    }
    None
}

/// Create hash-based symlink for deduplication
fn create_hash_symlink(category_dir: &FsPath, hash: &str, filename: &str) -> Result<(), AppError> {
    let hash_dir = category_dir.join("by_hash");
    let prefix = &hash[..2];
    let hash_subdir = hash_dir.join(prefix);
    fs::create_dir_all(&hash_subdir)
        .map_err(|e| AppError::internal(format!("Failed to create hash subdir: {}", e)))?;

    let hash_path = hash_subdir.join(hash);
    let target_path = PathBuf::from("../../").join(filename);

    symlink::symlink_auto(&target_path, &hash_path)
        .map_err(|e| AppError::internal(format!("Failed to create symlink: {}", e)))?;

    Ok(())
}

/// Process and compress image
fn process_and_compress_image(data: Vec<u8>) -> Result<(DynamicImage, Vec<u8>), AppError> {
    let img = image::load_from_memory(&data)
        .map_err(|e| AppError::validation(format!("Invalid image: {}", e)))?;

    // Save to buffer as JPG with quality setting
    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let rgb_img = img.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
        rgb_img
            .write_with_encoder(encoder)
            .map_err(|e| AppError::internal(format!("Failed to compress image: {}", e)))?;
    }

    Ok((img, buffer))
}

/// Validate image file
fn validate_image(data: &[u8], ext: &str) -> Result<(), AppError> {
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::validation(format!(
            "File too large. Maximum size is {} bytes ({}MB)",
            MAX_FILE_SIZE,
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    let ext_lower = ext.to_lowercase();
    if !SUPPORTED_FORMATS.contains(&ext_lower.as_str()) {
        return Err(AppError::validation(format!(
            "Unsupported file format '{}'. Supported: {}",
            ext_lower,
            SUPPORTED_FORMATS.join(", ")
        )));
    }

    // Verify it's actually an image by trying to load it
    if let Err(e) = image::load_from_memory(data) {
        return Err(AppError::validation(format!(
            "Invalid image file ({}): {}",
            ext_lower, e
        )));
    }

    Ok(())
}

/// POST /api/upload/:category - 上传图片
pub async fn upload(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(category): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    if !CATEGORIES.contains(&category.as_str()) {
        return Err(AppError::validation(format!(
            "Unknown upload category '{}'. Supported: {}",
            category,
            CATEGORIES.join(", ")
        )));
    }

    let category_dir = PathBuf::from(state.config.uploads_dir()).join(&category);
    fs::create_dir_all(&category_dir)
        .map_err(|e| AppError::internal(format!("Failed to create upload directory: {}", e)))?;

    // Find the file field
    let mut field_data: Option<Vec<u8>> = None;
    let mut original_filename = None;

    while let Some(f) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {}", e)))?
    {
        let name = f.name().map(|s| s.to_string());
        if name.as_deref() == Some("file") || name.as_deref() == Some("") {
            original_filename = f.file_name().map(|s| s.to_string());
            field_data = Some(f.bytes().await?.to_vec());
            break;
        }
    }

    let data = field_data.ok_or_else(|| {
        AppError::validation("No 'file' field found. Field name must be 'file'".to_string())
    })?;

    let filename = original_filename
        .ok_or_else(|| AppError::validation("No filename provided in file field".to_string()))?;

    if data.is_empty() {
        return Err(AppError::validation("Empty file provided".to_string()));
    }

    // Extract file extension
    let ext = PathBuf::from(&filename)
        .extension()
        .and_then(|ext| ext.to_str().map(|s| s.to_string()))
        .ok_or_else(|| AppError::validation(format!("Invalid file extension for: {}", filename)))?;

    validate_image(&data, &ext)?;

    let (_original_img, compressed_data) = process_and_compress_image(data)?;

    // Content hash for deduplication
    let file_hash = calculate_hash(&compressed_data);

    if let Some(existing_filename) = find_file_by_hash(&category_dir, &file_hash) {
        tracing::info!(
            original_name = %filename,
            existing_file = %existing_filename,
            "Duplicate image detected, returning existing file"
        );

        let file_id = existing_filename
            .strip_suffix(".jpg")
            .map(|s| s.to_string())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        return Ok(Json(UploadResponse {
            url: format!("/uploads/{}/{}", category, existing_filename),
            file_id,
            filename: existing_filename,
            original_name: filename,
            size: compressed_data.len(),
        }));
    }

    // New file: <uuid>.jpg
    let file_id = Uuid::new_v4().to_string();
    let stored_filename = format!("{}.jpg", file_id);
    let file_path = category_dir.join(&stored_filename);

    fs::write(&file_path, &compressed_data)
        .map_err(|e| AppError::internal(format!("Failed to write file: {}", e)))?;

    if let Err(e) = create_hash_symlink(&category_dir, &file_hash, &stored_filename) {
        // 去重索引失败不影响上传本身
        tracing::warn!(error = %e, "Failed to create dedup symlink");
    }

    tracing::info!(
        user_id = current_user.id,
        category = %category,
        filename = %stored_filename,
        size = compressed_data.len(),
        "Image uploaded"
    );

    Ok(Json(UploadResponse {
        url: format!("/uploads/{}/{}", category, stored_filename),
        file_id,
        filename: stored_filename,
        original_name: filename,
        size: compressed_data.len(),
    }))
}
