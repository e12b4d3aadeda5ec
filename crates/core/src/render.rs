//! LaTeX paper rendering
//!
//! Turns a validated [`BenchmarkResult`] into the paper source. The skeleton is a
//! minijinja template using LaTeX-friendly delimiters (`\VAR{..}`, `\BLOCK{..}`)
//! so ordinary braces in the document need no escaping. Table rows, the plot
//! and the appendix are assembled in Rust where the number formatting lives.

use awardbench_schemas::{BenchmarkResult, MetricDescriptor, ModelEntry, Validated, ValidationError};
use indexmap::IndexMap;
use minijinja::syntax::SyntaxConfig;
use minijinja::{context, Environment, UndefinedBehavior};

use crate::error::RenderError;
use crate::latex;

const PAPER_TEMPLATE_NAME: &str = "paper.tex";
const PAPER_TEMPLATE: &str = include_str!("../templates/paper.tex");

/// Line colors for the plotted models, in rank order
const PLOT_COLORS: [&str; 3] = ["accentgreen", "blue", "red"];

/// Title block of the paper
#[derive(Debug, Clone)]
pub struct PaperConfig {
    pub title: String,
    pub author: String,
    pub affiliation: String,
    pub contact_email: String,
    /// Fixed date text; `None` lets LaTeX print `\today`
    pub date: Option<String>,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            title: "AwardBench: A Comprehensive Benchmark for Government Contracting AI Systems"
                .to_string(),
            author: "Awarded AI Research Team".to_string(),
            affiliation: "Procurement Sciences Inc.".to_string(),
            contact_email: "research@awarded.ai".to_string(),
            date: None,
        }
    }
}

impl PaperConfig {
    /// Pin the date so output does not depend on when LaTeX runs
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    fn date_markup(&self) -> String {
        match &self.date {
            Some(date) => latex::escape(date),
            None => "\\today".to_string(),
        }
    }
}

/// Renders benchmark records into LaTeX source
pub struct PaperRenderer {
    env: Environment<'static>,
    paper: PaperConfig,
}

impl PaperRenderer {
    pub fn new(paper: PaperConfig) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.set_syntax(
            SyntaxConfig::builder()
                .block_delimiters("\\BLOCK{", "}")
                .variable_delimiters("\\VAR{", "}")
                .comment_delimiters("\\#{", "}")
                .build()?,
        );
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_filter("latex", |value: String| latex::escape(&value));
        env.add_template(PAPER_TEMPLATE_NAME, PAPER_TEMPLATE)?;

        Ok(Self { env, paper })
    }

    pub fn paper(&self) -> &PaperConfig {
        &self.paper
    }

    /// Validate and render a record
    pub fn render(&self, result: &BenchmarkResult) -> Result<String, RenderError> {
        let record = result.validate()?;
        self.render_validated(&record)
    }

    /// Render a record that already passed validation
    pub fn render_validated(&self, record: &Validated<'_>) -> Result<String, RenderError> {
        let leader = record.leader();
        let (first_key, first_metric) = record.first_metric();
        let columns = record.table_columns();
        let column_labels: Vec<&str> = columns
            .iter()
            .map(|key| record.result().metrics[*key].column_label())
            .collect();

        let table_rows = render_table(record.entries(), &columns)?;
        let plot_lines = render_plot(record)?;
        let appendix = render_appendix(&record.result().metrics);

        let template = self.env.get_template(PAPER_TEMPLATE_NAME)?;
        let document = template.render(context! {
            title => self.paper.title,
            author => self.paper.author,
            affiliation => self.paper.affiliation,
            contact_email => self.paper.contact_email,
            date => self.paper.date_markup(),

            leader_name => leader.name,
            leader_overall => latex::percent(leader.overall_score),
            first_metric_name => first_metric.name,
            leader_first_metric => latex::percent(record.score(leader, first_key)),

            column_spec => format!("l{}", "c".repeat(columns.len() + 1)),
            column_labels => column_labels,
            table_rows => table_rows,
            plot_lines => plot_lines,
            appendix => appendix,
        })?;

        tracing::debug!(
            leader = %leader.name,
            entries = record.entries().len(),
            metrics = record.result().metrics.len(),
            bytes = document.len(),
            "Rendered paper"
        );

        Ok(document)
    }
}

/// Validate and render with the given paper configuration
pub fn render(result: &BenchmarkResult, paper: &PaperConfig) -> Result<String, RenderError> {
    PaperRenderer::new(paper.clone())?.render(result)
}

/// Leaderboard table body: one row per entry, in input order
///
/// Each row holds the model name, the overall score and one column per metric
/// key in `columns`, all with three decimals. Every row ends with `\\` so the
/// closing rule can follow directly.
pub fn render_table(entries: &[ModelEntry], columns: &[&str]) -> Result<String, ValidationError> {
    let mut rows = Vec::with_capacity(entries.len());

    for entry in entries {
        let mut cells = vec![latex::escape(&entry.name), latex::score(entry.overall_score)];
        for key in columns {
            let value = entry
                .score(key)
                .ok_or_else(|| ValidationError::MissingScore {
                    model: entry.name.clone(),
                    metric: key.to_string(),
                })?;
            cells.push(latex::score(value));
        }
        rows.push(format!("{} \\\\", cells.join(" & ")));
    }

    Ok(rows.join("\n"))
}

/// Appendix body: one subsection per metric, in insertion order
pub fn render_appendix(metrics: &IndexMap<String, MetricDescriptor>) -> String {
    metrics
        .values()
        .map(|metric| {
            format!(
                "\\subsection{{{}}}\n{}\n\nBest performing model: {} (Score: {})\n",
                latex::escape(&metric.name),
                latex::escape(&metric.description),
                latex::escape(&metric.best_model),
                latex::score(metric.best_score),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// pgfplots series for the top three models, one coordinate per metric
fn render_plot(record: &Validated<'_>) -> Result<String, ValidationError> {
    let keys: Vec<&str> = record.metrics().map(|(key, _)| key).collect();
    let mut lines = Vec::new();

    for (entry, color) in record.entries().iter().zip(PLOT_COLORS) {
        let mut coordinates = Vec::with_capacity(keys.len());
        for (idx, key) in keys.iter().enumerate() {
            let value = entry
                .score(key)
                .ok_or_else(|| ValidationError::MissingScore {
                    model: entry.name.clone(),
                    metric: key.to_string(),
                })?;
            coordinates.push(format!("({},{})", idx + 1, value));
        }
        lines.push(format!(
            "\\addplot[color={},mark=*] coordinates {{{}}};",
            color,
            coordinates.join(" ")
        ));
        lines.push(format!("\\addlegendentry{{{}}}", latex::escape(&entry.name)));
    }

    Ok(lines.join("\n"))
}
