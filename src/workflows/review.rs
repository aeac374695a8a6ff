//! AI code review: generation, terminal display, and delivery to a merge
//! request as inline comments.
//!
//! Delivery prefers one inline discussion per finding. When the diff refs
//! are incomplete no inline comment can be anchored, so the whole report
//! goes out as one bundled comment. When only some inline posts fail, the
//! failed subset is bundled instead; partial failure degrades, it never
//! aborts.

use crate::error::AppError;
use crate::models::{DiffRefs, Finding, ReviewReport, Severity};
use crate::services::{Completion, ResponseFormat, Tracker, Vcs};
use console::style;

/// System prompt for the reviewer model.
const REVIEW_SYSTEM_PROMPT: &str = r#"You are a senior code reviewer performing a thorough code review. Analyze the provided git diff and identify issues.

**CRITICAL RULES:**
1. Output ONLY valid JSON - no markdown, no code blocks, no explanations
2. Focus on actual problems in the code, not style preferences
3. Be concise and actionable
4. If no issues found, return empty arrays
5. Extract EXACT line numbers from the diff (look for +line_number or new_line markers)

**Output format (pure JSON only):**
{
  "critical": [{"file": "path/to/file", "line": numeric_line_number, "issue": "brief description"}],
  "high": [{"file": "path/to/file", "line": numeric_line_number, "issue": "brief description"}],
  "medium": [{"file": "path/to/file", "line": numeric_line_number, "issue": "brief description"}],
  "low": [{"file": "path/to/file", "line": numeric_line_number, "issue": "brief description"}],
  "summary": "one-sentence overall assessment"
}

**IMPORTANT:**
- "line" must be a NUMBER (not string like "10-15" or "approx 20")
- "file" must be the exact file path from the diff
- Use the NEW line number (after changes) from the diff header

**Severity guidelines:**
- CRITICAL: Security vulnerabilities, data loss, crashes, exposed secrets
- HIGH: Logic errors, race conditions, resource leaks, incorrect algorithms
- MEDIUM: Code smells, potential bugs, missing error handling
- LOW: Minor improvements, suggestions, style inconsistencies"#;

/// Outcome of one delivery run: the posted/failed partition.
#[derive(Debug, Default)]
pub struct DeliveryOutcome {
    /// Number of findings posted inline.
    pub posted: usize,

    /// Findings that could not be posted inline, in delivery order.
    pub failed: Vec<(Severity, Finding)>,
}

/// Review the current branch's diff against the default branch.
///
/// Returns `None` when there is nothing to review: on the default branch,
/// or an empty diff.
pub async fn generate(
    vcs: &dyn Vcs,
    completion: &dyn Completion,
) -> Result<Option<ReviewReport>, AppError> {
    let default_branch = vcs.default_branch().unwrap_or_else(|_| "master".to_string());
    let current = vcs.current_branch()?;

    if current == default_branch {
        println!(
            "{} You are on the default branch ({}). Nothing to review.",
            style("⚠").yellow(),
            default_branch
        );
        return Ok(None);
    }

    let diff = vcs.diff_against(&default_branch)?;
    if diff.trim().is_empty() {
        println!(
            "{} No changes between {} and {}.",
            style("ℹ").cyan(),
            current,
            default_branch
        );
        return Ok(None);
    }

    let raw = completion
        .complete(
            REVIEW_SYSTEM_PROMPT,
            &format!("Review this git diff:\n\n{}", diff),
            ResponseFormat::JsonObject,
        )
        .await?;

    let report: ReviewReport = serde_json::from_str(&raw)
        .map_err(|e| AppError::ai(format!("model response is not the expected JSON: {}", e)))?;
    Ok(Some(report))
}

/// Print the report to the terminal, colored by severity.
pub fn display(report: &ReviewReport) {
    println!("{}", style("=".repeat(70)).bold());
    println!("{}", style("  AI CODE REVIEW").bold());
    println!("{}", style("=".repeat(70)).bold());

    if report.total() == 0 {
        println!("{}", style("✓ No issues found!").cyan().bold());
    } else {
        println!("{}", style(format!("Found {} issue(s):", report.total())).bold());
        for severity in Severity::ALL {
            let findings = report.bucket(severity);
            if findings.is_empty() {
                continue;
            }
            println!(
                "\n{} {}",
                severity.emoji(),
                style(severity.as_str().to_uppercase()).bold()
            );
            for finding in findings {
                println!("  • {}", style(finding.location()).bold());
                println!("    {}", finding.issue);
            }
        }
    }

    if let Some(summary) = &report.summary {
        println!("\n{}", style("Summary:").bold());
        println!("  {}", style(summary).dim());
    }
    println!("{}", style("=".repeat(70)).bold());
}

/// Deliver a report to a merge request.
pub struct ReviewDelivery<'a> {
    tracker: &'a dyn Tracker,
}

impl<'a> ReviewDelivery<'a> {
    pub fn new(tracker: &'a dyn Tracker) -> Self {
        Self { tracker }
    }

    /// Run the delivery state machine.
    ///
    /// Zero findings: a single "no issues" note. Incomplete diff refs: one
    /// bundled comment with everything. Otherwise one inline comment per
    /// finding, then one bundle for whatever failed.
    pub async fn deliver(
        &self,
        project: &str,
        mr_iid: i64,
        report: &ReviewReport,
    ) -> Result<DeliveryOutcome, AppError> {
        if report.total() == 0 {
            self.tracker
                .post_note(project, mr_iid, &format_bundle(report))
                .await?;
            println!("{} No issues; posted an all-clear note.", style("✓").green());
            return Ok(DeliveryOutcome::default());
        }

        let refs = self.tracker.get_diff_refs(project, mr_iid).await?;
        if !refs.is_complete() {
            println!(
                "{} Could not get diff refs; posting one bundled comment.",
                style("⚠").yellow()
            );
            self.tracker
                .post_note(project, mr_iid, &format_bundle(report))
                .await?;
            return Ok(DeliveryOutcome {
                posted: 0,
                failed: report
                    .iter()
                    .map(|(s, f)| (s, f.clone()))
                    .collect(),
            });
        }

        let mut outcome = DeliveryOutcome::default();
        for (severity, finding) in report.iter() {
            match self.post_inline(project, mr_iid, severity, finding, &refs).await {
                Ok(()) => {
                    outcome.posted += 1;
                    println!(
                        "{} Posted {} issue on {}",
                        style("✓").green(),
                        severity,
                        finding.location()
                    );
                }
                Err(e) => {
                    log::debug!("inline comment failed for {}: {}", finding.location(), e);
                    println!(
                        "  {} {} ({})",
                        style("failed").dim(),
                        finding.location(),
                        e
                    );
                    outcome.failed.push((severity, finding.clone()));
                }
            }
        }

        if outcome.failed.is_empty() {
            println!(
                "{} All {} issues posted as inline comments.",
                style("✓").green(),
                outcome.posted
            );
        } else {
            self.tracker
                .post_note(project, mr_iid, &format_failed_bundle(&outcome.failed))
                .await?;
        }
        Ok(outcome)
    }

    /// One inline attempt. Line coercion failures are recorded without a
    /// network call.
    async fn post_inline(
        &self,
        project: &str,
        mr_iid: i64,
        severity: Severity,
        finding: &Finding,
        refs: &DiffRefs,
    ) -> Result<(), AppError> {
        let line = finding.line_number()?;
        let body = format!(
            "{} **{}**: {}",
            severity.emoji(),
            severity.as_str().to_uppercase(),
            finding.issue
        );
        self.tracker
            .post_inline_comment(project, mr_iid, &body, &finding.file, line, refs)
            .await
    }
}

/// Markdown bundle for a full report: sections per severity, each finding
/// as `file:line` plus description.
pub fn format_bundle(report: &ReviewReport) -> String {
    if report.total() == 0 {
        return "## 🤖 AI Code Review\n\n✅ **No issues found!** Code looks good to merge."
            .to_string();
    }

    let mut comment = String::from("## 🤖 AI Code Review\n\n");
    comment.push_str(&format!("**Found {} issue(s)**\n\n", report.total()));

    for severity in Severity::ALL {
        let findings = report.bucket(severity);
        if findings.is_empty() {
            continue;
        }
        comment.push_str(&format!(
            "### {} {}\n\n",
            severity.emoji(),
            capitalize(severity.as_str())
        ));
        for finding in findings {
            comment.push_str(&format!(
                "- **`{}`** - {}\n",
                finding.location(),
                finding.issue
            ));
        }
        comment.push('\n');
    }

    if let Some(summary) = &report.summary {
        comment.push_str(&format!("---\n**Summary:** {}\n", summary));
    }
    comment
}

/// Markdown bundle for the findings that could not be posted inline.
pub fn format_failed_bundle(failed: &[(Severity, Finding)]) -> String {
    let mut comment = String::from("## 🤖 AI Code Review\n\n");
    comment.push_str("### Issues (could not post inline):\n");
    for (severity, finding) in failed {
        comment.push_str(&format!(
            "- {} **`{}`** - {}\n",
            severity.emoji(),
            finding.location(),
            finding.issue
        ));
    }
    comment
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
