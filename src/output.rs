//! 解析結果の出力

use crate::analyzer::AnalysisReport;
use crate::cli::OutputFormat;
use crate::error::Result;
use doc_snap_common::{render_html, render_text};
use std::path::Path;

/// 指定形式の文字列に変換
pub fn format_report(report: &AnalysisReport, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => render_text(&report.outcome),
        OutputFormat::Html => render_html(&report.outcome),
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
    })
}

/// ファイルまたは標準出力へ書き出す
pub fn write_report(report: &AnalysisReport, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let content = format_report(report, format)?;
    match output {
        Some(path) => {
            std::fs::write(path, content)?;
            println!("✔ 結果を保存: {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
