use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{4,32}$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^1\d{10}$").expect("Invalid phone regex"));

static ID_CARD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{17}[\dXx]$").expect("Invalid id card regex"));

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid date regex"));

const WEAK_PASSWORDS: [&str; 8] = [
    "password",
    "12345678",
    "123456789",
    "qwerty123",
    "admin123",
    "password1",
    "abcd1234",
    "student123",
];

/// 用户名：4 到 32 位字母、数字、下划线或连字符（学生账号即学号）
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if !USERNAME_RE.is_match(username) {
        return Err("用户名须为 4-32 位字母、数字、下划线或连字符");
    }
    Ok(())
}

/// 密码策略：至少 8 位，同时包含大写字母、小写字母和数字，且不是常见弱密码
pub fn validate_password(password: &str) -> Result<(), String> {
    let mut errors: Vec<&str> = Vec::new();

    if password.chars().count() < 8 {
        errors.push("密码长度至少 8 位");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("密码须包含大写字母");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("密码须包含小写字母");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("密码须包含数字");
    }
    if WEAK_PASSWORDS
        .iter()
        .any(|weak| password.eq_ignore_ascii_case(weak))
    {
        errors.push("密码过于常见");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if !EMAIL_RE.is_match(email) {
        return Err("邮箱格式错误");
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    if !PHONE_RE.is_match(phone) {
        return Err("手机号格式错误");
    }
    Ok(())
}

pub fn validate_id_card(id_card: &str) -> Result<(), &'static str> {
    if !ID_CARD_RE.is_match(id_card) {
        return Err("身份证号格式错误");
    }
    Ok(())
}

/// 日期字段（出生日期、入学日期）：YYYY-MM-DD 且为合法日期
pub fn validate_date(value: &str) -> Result<(), &'static str> {
    if !DATE_RE.is_match(value) || chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Err("日期格式错误，应为 YYYY-MM-DD");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username() {
        assert!(validate_username("2023001").is_ok());
        assert!(validate_username("t_li").is_ok());
        assert!(validate_username("abc").is_err());
        assert!(validate_username("张三同学").is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password("Student@123").is_ok());
        assert!(validate_password("SecurePass123").is_ok());

        let err = validate_password("abc").unwrap_err();
        assert!(err.contains("密码长度至少 8 位"));
        assert!(err.contains("大写字母"));

        let err = validate_password("Password1").unwrap_err();
        assert!(err.contains("密码过于常见"));
    }

    #[test]
    fn test_contact_fields() {
        assert!(validate_email("zhangsan@example.edu.cn").is_ok());
        assert!(validate_email("zhangsan@").is_err());
        assert!(validate_phone("13800138000").is_ok());
        assert!(validate_phone("2380013800").is_err());
        assert!(validate_id_card("11010519491231002X").is_ok());
        assert!(validate_id_card("1101051949").is_err());
    }

    #[test]
    fn test_date() {
        assert!(validate_date("2003-02-28").is_ok());
        assert!(validate_date("2003-02-30").is_err());
        assert!(validate_date("2003/02/28").is_err());
    }
}
