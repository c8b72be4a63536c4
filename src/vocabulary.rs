//! Fixed financial metric vocabulary
//!
//! Metric names the extractor may emit are drawn from five statement
//! categories. Free-text terms are mapped onto that vocabulary through an
//! explicit synonym table; anything else is dropped rather than invented.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Financial statement categories served by the data provider
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum StatementCategory {
    IncomeStatement,
    BalanceSheet,
    CashFlow,
    KeyMetrics,
    Ratios,
}

impl StatementCategory {
    pub const ALL: [StatementCategory; 5] = [
        StatementCategory::IncomeStatement,
        StatementCategory::BalanceSheet,
        StatementCategory::CashFlow,
        StatementCategory::KeyMetrics,
        StatementCategory::Ratios,
    ];

    /// Provider path segment, also used as the bundle key
    pub fn endpoint(&self) -> &'static str {
        match self {
            StatementCategory::IncomeStatement => "income-statement",
            StatementCategory::BalanceSheet => "balance-sheet-statement",
            StatementCategory::CashFlow => "cash-flow-statement",
            StatementCategory::KeyMetrics => "key-metrics",
            StatementCategory::Ratios => "ratios",
        }
    }

    pub fn metrics(&self) -> &'static [&'static str] {
        match self {
            StatementCategory::IncomeStatement => INCOME_STATEMENT_METRICS,
            StatementCategory::BalanceSheet => BALANCE_SHEET_METRICS,
            StatementCategory::CashFlow => CASH_FLOW_METRICS,
            StatementCategory::KeyMetrics => KEY_METRICS,
            StatementCategory::Ratios => RATIO_METRICS,
        }
    }

    pub fn contains(&self, metric: &str) -> bool {
        self.metrics().contains(&metric)
    }
}

impl fmt::Display for StatementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.endpoint())
    }
}

pub const INCOME_STATEMENT_METRICS: &[&str] = &[
    "revenue",
    "cost of revenue",
    "gross profit",
    "operating expenses",
    "research and development",
    "operating income",
    "ebitda",
    "interest expense",
    "income tax expense",
    "net income",
    "eps",
    "diluted eps",
    "revenue growth",
];

pub const BALANCE_SHEET_METRICS: &[&str] = &[
    "total assets",
    "current assets",
    "cash and cash equivalents",
    "inventory",
    "accounts receivable",
    "goodwill",
    "total liabilities",
    "current liabilities",
    "total debt",
    "net debt",
    "total equity",
];

pub const CASH_FLOW_METRICS: &[&str] = &[
    "operating cash flow",
    "capital expenditure",
    "free cash flow",
    "dividends paid",
    "stock repurchases",
    "net change in cash",
];

pub const KEY_METRICS: &[&str] = &[
    "revenue per share",
    "net income per share",
    "book value per share",
    "free cash flow per share",
    "market cap",
    "enterprise value",
    "pe ratio",
    "price to sales ratio",
    "ev to ebitda",
    "free cash flow yield",
    "dividend yield",
    "ebitda",
    "revenue growth",
];

pub const RATIO_METRICS: &[&str] = &[
    "gross profit margin",
    "operating profit margin",
    "profit margin",
    "return on equity",
    "return on assets",
    "current ratio",
    "quick ratio",
    "debt to equity",
    "interest coverage",
    "asset turnover",
    "pe ratio",
    "price to book ratio",
    "dividend payout ratio",
];

/// Free-text term → canonical metric(s)
const SYNONYMS: &[(&str, &[&str])] = &[
    ("sales", &["revenue"]),
    ("revenues", &["revenue"]),
    ("top line", &["revenue"]),
    ("turnover", &["revenue"]),
    ("earnings", &["net income"]),
    ("profit", &["net income"]),
    ("profits", &["net income"]),
    ("net profit", &["net income"]),
    ("net earnings", &["net income"]),
    ("bottom line", &["net income"]),
    ("p/e", &["pe ratio"]),
    ("pe", &["pe ratio"]),
    ("p/e ratio", &["pe ratio"]),
    ("price to earnings", &["pe ratio"]),
    ("price-to-earnings", &["pe ratio"]),
    ("price earnings ratio", &["pe ratio"]),
    ("growth", &["revenue growth"]),
    ("sales growth", &["revenue growth"]),
    ("top line growth", &["revenue growth"]),
    ("earnings per share", &["eps"]),
    ("profitability", &["profit margin", "net income"]),
    ("margin", &["profit margin"]),
    ("margins", &["profit margin"]),
    ("net margin", &["profit margin"]),
    ("net profit margin", &["profit margin"]),
    ("gross margin", &["gross profit margin"]),
    ("operating margin", &["operating profit margin"]),
    ("operating profit", &["operating income"]),
    ("cogs", &["cost of revenue"]),
    ("cost of goods sold", &["cost of revenue"]),
    ("opex", &["operating expenses"]),
    ("r&d", &["research and development"]),
    ("capex", &["capital expenditure"]),
    ("capital expenditures", &["capital expenditure"]),
    ("fcf", &["free cash flow"]),
    ("cash flow", &["operating cash flow"]),
    ("buybacks", &["stock repurchases"]),
    ("share buybacks", &["stock repurchases"]),
    ("cash", &["cash and cash equivalents"]),
    ("debt", &["total debt"]),
    ("leverage", &["debt to equity"]),
    ("debt/equity", &["debt to equity"]),
    ("d/e", &["debt to equity"]),
    ("liquidity", &["current ratio", "quick ratio"]),
    ("roe", &["return on equity"]),
    ("roa", &["return on assets"]),
    ("market capitalization", &["market cap"]),
    ("valuation", &["pe ratio", "enterprise value"]),
    ("dividend", &["dividend yield"]),
    ("dividends", &["dividend yield"]),
];

/// Every canonical metric name, in category order without duplicates
pub fn canonical_metrics() -> Vec<&'static str> {
    let mut all: Vec<&'static str> = Vec::new();
    for category in StatementCategory::ALL {
        for metric in category.metrics() {
            if !all.contains(metric) {
                all.push(metric);
            }
        }
    }
    all
}

pub fn is_canonical(metric: &str) -> bool {
    StatementCategory::ALL.iter().any(|c| c.contains(metric))
}

fn clean(term: &str) -> String {
    term.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Map one free-text term onto the vocabulary. Unknown terms map to nothing.
pub fn normalize_metric(term: &str) -> Vec<&'static str> {
    let cleaned = clean(term);

    if let Some(canonical) = canonical_metrics().into_iter().find(|m| *m == cleaned) {
        return vec![canonical];
    }

    SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == cleaned)
        .map(|(_, targets)| targets.to_vec())
        .unwrap_or_default()
}

/// Normalize a list of terms, keeping first-seen order and dropping duplicates
pub fn normalize_metrics<S: AsRef<str>>(terms: &[S]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(terms.len());

    for term in terms {
        for metric in normalize_metric(term.as_ref()) {
            if !normalized.iter().any(|m| m == metric) {
                normalized.push(metric.to_string());
            }
        }
    }

    normalized
}

/// Statement categories needed to answer for `metrics`, in first-needed order.
/// A metric listed in several categories pulls in each of them.
pub fn required_statements<S: AsRef<str>>(metrics: &[S]) -> Vec<StatementCategory> {
    let mut statements = Vec::new();

    for metric in metrics {
        let metric = clean(metric.as_ref());
        for category in StatementCategory::ALL {
            if category.contains(&metric) && !statements.contains(&category) {
                statements.push(category);
            }
        }
    }

    statements
}

/// Synonym table rendered for inclusion in extraction prompts
pub fn synonym_guide() -> String {
    SYNONYMS
        .iter()
        .map(|(synonym, targets)| format!("- \"{}\" → {}", synonym, targets.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synonyms_map_to_canonical_terms() {
        let normalized = normalize_metrics(&["profits", "p/e", "growth"]);
        assert_eq!(normalized, vec!["net income", "pe ratio", "revenue growth"]);
    }

    #[test]
    fn test_multi_mapping_and_dedup() {
        let normalized = normalize_metrics(&["Profitability", "earnings"]);
        assert_eq!(normalized, vec!["profit margin", "net income"]);
    }

    #[test]
    fn test_unknown_terms_are_dropped() {
        assert!(normalize_metric("customer happiness index").is_empty());
        assert_eq!(normalize_metrics(&["vibes", "Revenue"]), vec!["revenue"]);
    }

    #[test]
    fn test_every_synonym_targets_the_vocabulary() {
        for (synonym, targets) in SYNONYMS {
            for target in *targets {
                assert!(is_canonical(target), "{} → {} is not canonical", synonym, target);
            }
        }
    }

    #[test]
    fn test_required_statements() {
        assert_eq!(
            required_statements(&["revenue"]),
            vec![StatementCategory::IncomeStatement]
        );
        assert_eq!(
            required_statements(&["pe ratio", "total debt"]),
            vec![
                StatementCategory::KeyMetrics,
                StatementCategory::Ratios,
                StatementCategory::BalanceSheet
            ]
        );
        assert!(required_statements(&["not a metric"]).is_empty());
    }
}
