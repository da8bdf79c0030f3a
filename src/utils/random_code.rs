use rand::Rng;

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const PASSWORD_SYMBOLS: &[u8] = b"!@#$%^&*-_";

fn sample(charset: &[u8], length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| charset[rng.random_range(0..charset.len())] as char)
        .collect()
}

/// 随机初始密码，保证包含大小写字母与数字
pub fn generate_random_password(length: usize) -> String {
    let length = length.max(8);
    let mut charset = ALPHANUMERIC.to_vec();
    charset.extend_from_slice(PASSWORD_SYMBOLS);

    loop {
        let candidate = sample(&charset, length);
        if candidate.chars().any(|c| c.is_ascii_uppercase())
            && candidate.chars().any(|c| c.is_ascii_lowercase())
            && candidate.chars().any(|c| c.is_ascii_digit())
        {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validate::validate_password;

    #[test]
    fn test_random_password_meets_policy() {
        for _ in 0..20 {
            let password = generate_random_password(16);
            assert_eq!(password.len(), 16);
            assert!(validate_password(&password).is_ok());
        }
        assert_eq!(generate_random_password(4).len(), 8);
    }
}
