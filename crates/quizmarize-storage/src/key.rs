//! Object key and public URL conventions.

use std::path::Path;

/// Build the key a user's upload is stored under.
///
/// `user_<user_id>/<32 hex chars>.<ext>`, without a trailing dot when the
/// original filename has no extension.
pub fn object_key(user_id: &str, filename: &str) -> String {
    let token = uuid::Uuid::new_v4().simple().to_string();
    match Path::new(filename).extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => format!("user_{}/{}.{}", user_id, token, ext),
        _ => format!("user_{}/{}", user_id, token),
    }
}

/// `http://<public_host>/<bucket>/<key>`
pub fn public_url(public_host: &str, bucket: &str, key: &str) -> String {
    format!(
        "http://{}/{}/{}",
        public_host.trim_end_matches('/'),
        bucket,
        key.trim_start_matches('/')
    )
}

/// Anonymous read access to every object of the bucket.
pub fn public_read_policy(bucket: &str) -> String {
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": "*",
            "Action": "s3:GetObject",
            "Resource": format!("arn:aws:s3:::{}/*", bucket),
        }]
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_keeps_extension() {
        let key = object_key("42", "Lecture Notes.pdf");
        let (prefix, name) = key.split_once('/').unwrap();
        assert_eq!(prefix, "user_42");

        let (token, ext) = name.split_once('.').unwrap();
        assert_eq!(ext, "pdf");
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_object_key_without_extension() {
        let key = object_key("7", "README");
        assert!(key.starts_with("user_7/"));
        assert!(!key.contains('.'));
        assert_eq!(key.len(), "user_7/".len() + 32);
    }

    #[test]
    fn test_object_keys_are_unique() {
        assert_ne!(object_key("1", "a.pdf"), object_key("1", "a.pdf"));
    }

    #[test]
    fn test_public_url() {
        assert_eq!(
            public_url("localhost:9000", "quizmarize", "user_1/abc.pdf"),
            "http://localhost:9000/quizmarize/user_1/abc.pdf"
        );
    }

    #[test]
    fn test_public_read_policy() {
        let policy: serde_json::Value = serde_json::from_str(&public_read_policy("docs")).unwrap();
        assert_eq!(policy["Version"], "2012-10-17");
        assert_eq!(policy["Statement"][0]["Action"], "s3:GetObject");
        assert_eq!(policy["Statement"][0]["Resource"], "arn:aws:s3:::docs/*");
    }
}
