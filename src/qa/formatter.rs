//! 回答模板
//!
//! 只做字符串拼接，不含任何判断逻辑。

/// 缺少 question 参数时的提示
pub fn prompt() -> String {
    "Please provide a question using the 'question' parameter.".to_string()
}

/// 无法从问题中识别成员
pub fn unidentified() -> String {
    "I couldn't identify which member you're asking about. Please mention the member's name in your question.".to_string()
}

/// 上游没有任何可用数据
pub fn no_data() -> String {
    "Sorry, I couldn't fetch the member data at the moment. Please try again later.".to_string()
}

/// 识别出名字但目录中没有对应成员
pub fn not_found(key: &str, suggestions: &[&str]) -> String {
    if suggestions.is_empty() {
        return format!("I couldn't find member '{}'.", key);
    }
    format!(
        "I couldn't find member '{}'. Available members: {}",
        key,
        suggestions.join(", ")
    )
}

/// `"<name> <clause>."`
pub fn sentence(name: &str, clause: &str) -> String {
    terminate(format!("{} {}", name, clause.trim()))
}

/// `"<name>'s <clause>."`
pub fn possessive(name: &str, clause: &str) -> String {
    terminate(format!("{}'s {}", name, clause.trim()))
}

/// 不带主语的句子，例如 "I couldn't find ..."
pub fn statement(text: &str) -> String {
    terminate(text.trim().to_string())
}

fn terminate(mut text: String) -> String {
    if !text.ends_with(['.', '!', '?']) {
        text.push('.');
    }
    text
}
