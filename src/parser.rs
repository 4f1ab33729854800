use chrono::NaiveDate;
use regex::Regex;

#[derive(Debug, PartialEq)]
pub struct ParsedTask {
    pub title: String,
    pub priority: Option<String>,
    pub tags: Vec<String>,
    pub deadline: Option<NaiveDate>,
}

/// Quick-add syntax: `!priority`, `#tag`, `@YYYY-MM-DD`.
pub fn parse_task_input(input: &str) -> ParsedTask {
    let priority_re = Regex::new(r"(?:^|\s)!([A-Za-z_]\w*)").unwrap();
    let tag_re = Regex::new(r"(?:^|\s)#([\w-]+)").unwrap();
    let deadline_re = Regex::new(r"(?:^|\s)@(\d{4}-\d{2}-\d{2})\b").unwrap();

    let mut title = input.to_string();

    // Priority, first one wins
    let priority = priority_re
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase());
    title = priority_re.replace_all(&title, " ").to_string();

    let tags: Vec<String> = tag_re
        .captures_iter(input)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect();
    title = tag_re.replace_all(&title, " ").to_string();

    // Invalid dates stay part of the title.
    let mut deadline = None;
    for caps in deadline_re.captures_iter(input) {
        if let (Some(whole), Some(date)) = (caps.get(0), caps.get(1)) {
            if let Ok(d) = NaiveDate::parse_from_str(date.as_str(), "%Y-%m-%d") {
                title = title.replacen(whole.as_str().trim_start(), " ", 1);
                if deadline.is_none() {
                    deadline = Some(d);
                }
            }
        }
    }

    let title = Regex::new(r"\s+")
        .unwrap()
        .replace_all(&title, " ")
        .trim()
        .to_string();

    ParsedTask {
        title,
        priority,
        tags,
        deadline,
    }
}
