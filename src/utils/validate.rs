use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}$").expect("Invalid email regex")
});

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 -]{5,19}$").expect("Invalid phone regex"));

static MATRIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9/-]{3,32}$").expect("Invalid matric number regex"));

/// 姓名校验：1-64 个字符，不能只有空白
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name must not be empty");
    }
    if trimmed.chars().count() > 64 {
        return Err("Name must be at most 64 characters");
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err("Name contains invalid characters");
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    if !PHONE_RE.is_match(phone.trim()) {
        return Err("Phone number format is invalid");
    }
    Ok(())
}

pub fn validate_matric_number(matric_number: &str) -> Result<(), &'static str> {
    if !MATRIC_RE.is_match(matric_number) {
        return Err("Matric number must be 3-32 letters, digits, '/' or '-'");
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    // 邮箱格式校验：必须包含 @ 和 .
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 过于常见的密码，忽略大小写比较
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "12345678",
    "123456789",
    "qwerty123",
    "admin123",
    "abcd1234",
    "welcome1",
    "letmein1",
];

/// 每条规则：不满足时返回的提示
const PASSWORD_RULES: &[(fn(&str) -> bool, &str)] = &[
    (
        |p| p.chars().count() >= 8,
        "Password must be at least 8 characters long",
    ),
    (
        |p| p.chars().count() <= 128,
        "Password must be at most 128 characters long",
    ),
    (
        |p| p.chars().any(|c| c.is_ascii_uppercase()),
        "Password must contain at least one uppercase letter",
    ),
    (
        |p| p.chars().any(|c| c.is_ascii_lowercase()),
        "Password must contain at least one lowercase letter",
    ),
    (
        |p| p.chars().any(|c| c.is_ascii_digit()),
        "Password must contain at least one digit",
    ),
    (
        |p| !COMMON_PASSWORDS.iter().any(|w| p.eq_ignore_ascii_case(w)),
        "Password is too common, please choose a stronger password",
    ),
];

/// 列出密码未满足的全部规则
pub fn password_problems(password: &str) -> Vec<&'static str> {
    PASSWORD_RULES
        .iter()
        .filter(|(check, _)| !check(password))
        .map(|(_, message)| *message)
        .collect()
}

pub fn validate_password(password: &str) -> Result<(), String> {
    let problems = password_problems(password);
    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password() {
        assert!(validate_password("SecureP@ss1").is_ok());
        assert!(validate_password("SecurePass123").is_ok());
    }

    #[test]
    fn test_password_reports_every_problem() {
        let problems = password_problems("abc");
        assert!(problems.contains(&"Password must be at least 8 characters long"));
        assert!(problems.contains(&"Password must contain at least one uppercase letter"));
        assert!(problems.contains(&"Password must contain at least one digit"));
        assert!(!problems.contains(&"Password must contain at least one lowercase letter"));

        let message = validate_password("abc").unwrap_err();
        assert_eq!(message.matches("; ").count(), problems.len() - 1);
    }

    #[test]
    fn test_password_length_counts_characters() {
        assert!(password_problems(&format!("Aa1{}", "x".repeat(130))).contains(&"Password must be at most 128 characters long"));
        assert!(password_problems("Aa1ééééé").is_empty());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("jane.doe@uni.edu.ng").is_ok());
        assert!(validate_email("jane@localhost").is_err());
        assert!(validate_email("no-at-sign.com").is_err());
    }

    #[test]
    fn test_name() {
        assert!(validate_name("Ada").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_phone_and_matric() {
        assert!(validate_phone("+234 803-000-0000").is_ok());
        assert!(validate_phone("call me").is_err());
        assert!(validate_matric_number("CSC/2021/001").is_ok());
        assert!(validate_matric_number("a b").is_err());
    }

    #[test]
    fn test_common_password() {
        assert!(password_problems("Password1").contains(&"Password is too common, please choose a stronger password"));
        assert!(password_problems("WELCOME1").contains(&"Password is too common, please choose a stronger password"));
    }
}
