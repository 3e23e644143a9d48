use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};

use crate::models::GenerateRequest;

// Cache entry with timestamp
#[derive(Clone)]
pub struct CacheEntry {
    pub response: String,
    pub created_at: Instant,
}

impl CacheEntry {
    pub fn fresh(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() < ttl
    }
}

// Create a cache key (hash of prompt + style + attached images, with a
// separator byte between fields)
pub fn make_cache_key(req: &GenerateRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(&req.prompt);
    hasher.update([0u8]);
    hasher.update(&req.style);
    for img in &req.images {
        hasher.update([0u8]);
        hasher.update(&img.mime_type);
        hasher.update([0u8]);
        hasher.update(&img.data);
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InlineImage;

    fn request(prompt: &str, style: &str) -> GenerateRequest {
        GenerateRequest {
            prompt: prompt.to_string(),
            style: style.to_string(),
            images: vec![],
        }
    }

    #[test]
    fn key_is_stable_for_equal_requests() {
        assert_eq!(
            make_cache_key(&request("a dragon", "watercolor")),
            make_cache_key(&request("a dragon", "watercolor"))
        );
    }

    #[test]
    fn key_separates_prompt_and_style() {
        // same concatenation, different field split
        assert_ne!(
            make_cache_key(&request("ab", "c")),
            make_cache_key(&request("a", "bc"))
        );
    }

    #[test]
    fn attached_images_change_the_key() {
        let bare = request("a dragon", "watercolor");
        let mut with_image = bare.clone();
        with_image.images.push(InlineImage {
            mime_type: "image/png".to_string(),
            data: "aGVsbG8=".to_string(),
        });

        assert_ne!(make_cache_key(&bare), make_cache_key(&with_image));
    }

    #[test]
    fn entry_freshness_follows_ttl() {
        let entry = CacheEntry {
            response: String::new(),
            created_at: Instant::now(),
        };

        assert!(entry.fresh(Duration::from_secs(30)));
        assert!(!entry.fresh(Duration::ZERO));
    }
}
