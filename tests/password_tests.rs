use bonafide_backend::util::password::{PasswordUtils, PasswordUtilsImpl};

#[test]
fn test_hash_password_success() {
    let password = "test_password_123";
    let result = PasswordUtilsImpl::hash_password(password);

    assert!(result.is_ok());
    let hash = result.unwrap();

    // Hash should not be empty and never equal the plaintext
    assert!(!hash.is_empty());
    assert_ne!(hash, password);

    // Hash should be in Argon2 PHC string format
    assert!(hash.starts_with("$argon2"));
    let parts: Vec<&str> = hash.split('$').collect();
    assert!(parts.len() >= 5, "Hash should have at least 5 parts separated by $");
}

#[test]
fn test_verify_password_correct() {
    let password = "changeme123";
    let hash = PasswordUtilsImpl::hash_password(password).unwrap();

    let result = PasswordUtilsImpl::verify_password(password, &hash);
    assert!(result.is_ok());
    assert!(result.unwrap());
}

#[test]
fn test_verify_password_wrong() {
    let hash = PasswordUtilsImpl::hash_password("changeme123").unwrap();

    let result = PasswordUtilsImpl::verify_password("not-the-password", &hash);
    assert!(result.is_ok());
    assert!(!result.unwrap());
}

#[test]
fn test_verify_password_invalid_hash_fails_closed() {
    let result = PasswordUtilsImpl::verify_password("changeme123", "not-a-phc-string");
    assert!(result.is_err());
}

#[test]
fn test_hash_password_different_results() {
    // Per-record random salt: hashing the same password twice must not
    // produce the same string.
    let password = "same_password_each_time";
    let first = PasswordUtilsImpl::hash_password(password).unwrap();
    let second = PasswordUtilsImpl::hash_password(password).unwrap();
    assert_ne!(first, second);

    assert!(PasswordUtilsImpl::verify_password(password, &first).unwrap());
    assert!(PasswordUtilsImpl::verify_password(password, &second).unwrap());
}

#[test]
fn test_hash_password_unicode_characters() {
    let password = "Pássw0rd123!🔒";
    let hash = PasswordUtilsImpl::hash_password(password).unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(PasswordUtilsImpl::verify_password(password, &hash).unwrap());
}

#[test]
fn test_hash_password_empty_password() {
    // Empty passwords still hash; length policy is enforced at validation.
    let hash = PasswordUtilsImpl::hash_password("").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(PasswordUtilsImpl::verify_password("", &hash).unwrap());
    assert!(!PasswordUtilsImpl::verify_password("x", &hash).unwrap());
}
