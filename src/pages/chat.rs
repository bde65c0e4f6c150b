//! Weekly report chat.
//!
//! A keyword "chat" over the weekly reports. The [`Conversation`] is a plain
//! value owned by the caller: [`respond`] takes it, appends the user prompt
//! and the assistant reply, and hands it back.

use anyhow::Result;
use std::io::{BufRead, Write};

use super::{load_or_report, NO_DATA};
use crate::models::WeeklyReport;
use crate::search::search_reports;
use crate::store::DataStore;

/// Maximum number of reports shown in one reply or in the recent list.
pub const MAX_SHOWN: usize = 5;

pub const GREETING: &str = "Hello! Ask me about the weekly reports. \
Try a department such as '교학팀', a topic, or '이슈' for reports with issues.";

pub const NO_MATCH: &str = "No matching reports. Try another keyword.";

pub const TIP: &str =
    "Tip: search by department (교학팀, 대외협력팀, ...) or by a word such as '이슈'.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Chat history, starting with the assistant greeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: vec![Message {
                role: Role::Assistant,
                content: GREETING.to_string(),
            }],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Most recent assistant message.
    pub fn last_reply(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }

    fn push(&mut self, role: Role, content: String) {
        self.messages.push(Message { role, content });
    }
}

/// Answer `prompt` from `reports` and return the extended conversation.
pub fn respond(
    mut conversation: Conversation,
    prompt: &str,
    reports: &[WeeklyReport],
) -> Conversation {
    conversation.push(Role::User, prompt.to_string());
    let matches = search_reports(prompt, reports);
    let reply = if matches.is_empty() {
        format!("{NO_MATCH}\n{TIP}")
    } else {
        format_matches(&matches)
    };
    conversation.push(Role::Assistant, reply);
    conversation
}

/// Render up to [`MAX_SHOWN`] matches, headed by the total count.
pub fn format_matches(matches: &[&WeeklyReport]) -> String {
    let mut out = format!("Found {} report(s):\n", matches.len());
    for (i, report) in matches.iter().take(MAX_SHOWN).enumerate() {
        out.push('\n');
        out.push_str(&format!(
            "{}. {} - {}\n",
            i + 1,
            report.date,
            report.department
        ));
        out.push_str(&format!("   {}\n", report.summary));
        if !report.issues.is_empty() {
            out.push_str(&format!("   Issues: {}\n", report.issues.join(", ")));
        }
        if let Some(link) = &report.link {
            out.push_str(&format!("   Link: {link}\n"));
        }
    }
    if matches.len() > MAX_SHOWN {
        out.push_str(&format!(
            "\n({} more not shown; refine the keyword)\n",
            matches.len() - MAX_SHOWN
        ));
    }
    out
}

/// The [`MAX_SHOWN`] newest reports. Undated reports sort last.
pub fn recent_reports(reports: &[WeeklyReport]) -> Vec<&WeeklyReport> {
    let mut sorted: Vec<&WeeklyReport> = reports.iter().collect();
    sorted.sort_by(|a, b| b.parsed_date().cmp(&a.parsed_date()));
    sorted.truncate(MAX_SHOWN);
    sorted
}

pub fn run_search(store: &DataStore, query: &str) -> Result<()> {
    let Some(reports) = load_or_report::<Vec<WeeklyReport>>(store) else {
        return Ok(());
    };
    let conversation = respond(Conversation::new(), query, &reports);
    println!("{}", conversation.last_reply().unwrap_or(NO_MATCH));
    Ok(())
}

pub fn run_recent(store: &DataStore) -> Result<()> {
    let Some(reports) = load_or_report::<Vec<WeeklyReport>>(store) else {
        return Ok(());
    };
    println!("Recent weekly reports");
    println!("=====================");
    for report in recent_reports(&reports) {
        println!();
        println!("  {} - {}", report.date, report.department);
        println!("    Summary: {}", report.summary);
        if !report.issues.is_empty() {
            println!("    Issues:  {}", report.issues.join(", "));
        }
        if let Some(link) = &report.link {
            println!("    Link:    {link}");
        }
    }
    Ok(())
}

/// Interactive loop: one prompt per line until EOF, `exit`, or `quit`.
pub fn run_chat(store: &DataStore, input: impl BufRead, mut out: impl Write) -> Result<()> {
    let Some(reports) = load_or_report::<Vec<WeeklyReport>>(store) else {
        return Ok(());
    };

    let mut conversation = Conversation::new();
    writeln!(out, "{GREETING}")?;
    write!(out, "> ")?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        let prompt = line.trim();
        if prompt.eq_ignore_ascii_case("exit") || prompt.eq_ignore_ascii_case("quit") {
            break;
        }
        if !prompt.is_empty() {
            conversation = respond(conversation, prompt, &reports);
            writeln!(out, "{}", conversation.last_reply().unwrap_or(NO_MATCH))?;
        }
        write!(out, "> ")?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}
