//! 실행 전체의 검증 결과 모음

use super::compare::ComparisonReport;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub reports: Vec<ComparisonReport>,
}

impl ValidationSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 보고서를 기록하고 통과 여부를 돌려준다
    pub fn record(&mut self, report: ComparisonReport) -> bool {
        let passed = report.passed;
        if passed {
            log::info!("{}: OK", report.name);
        } else {
            log::warn!("{}: MISMATCH", report.name);
        }
        log::debug!("{}", report);
        self.reports.push(report);
        passed
    }

    pub fn extend(&mut self, other: ValidationSummary) {
        self.reports.extend(other.reports);
    }

    pub fn all_passed(&self) -> bool {
        self.reports.iter().all(|r| r.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ComparisonReport> {
        self.reports.iter().filter(|r| !r.passed)
    }

    pub fn get(&self, name: &str) -> Option<&ComparisonReport> {
        self.reports.iter().find(|r| r.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn overall(&self) -> &'static str {
        if self.all_passed() {
            "PASS"
        } else {
            "FAIL"
        }
    }

    /// 산출물별 OK / MISMATCH 와 OVERALL 줄
    pub fn render(&self) -> String {
        let width = self.reports.iter().map(|r| r.name.len()).max().unwrap_or(0);
        let mut out = String::from("SUMMARY\n");
        for r in &self.reports {
            out.push_str(&format!(
                "  {:<width$} : {}\n",
                r.name,
                if r.passed { "OK" } else { "MISMATCH" },
                width = width
            ));
        }
        out.push_str(&format!("\n  OVERALL: {}", self.overall()));
        out
    }

    pub fn log_summary(&self) {
        for line in self.render().lines() {
            log::info!("{}", line);
        }
    }
}
