//! Prompt templates and response schemas
//!
//! Every intent maps to exactly one extraction template and one schema
//! through exhaustive matches, so a new intent cannot be added without both.

use crate::llm::ResponseSchema;
use crate::models::{
    AnalysisType, IntentParameters, IntentType, Message, TimeFrame,
};
use crate::vocabulary::{self, StatementCategory};
use chrono::NaiveDate;
use serde_json::{json, Value};

pub const CLASSIFICATION_SCHEMA: &str = "query_analysis";
pub const CONTINUITY_SCHEMA: &str = "context_analysis";

/// Used whenever classification yields nothing usable
pub const FALLBACK_CLARIFY_QUESTION: &str = "I'm having trouble understanding your question. Could you please rephrase it or provide more details?";

pub const SYNTHESIS_SYSTEM_MESSAGE: &str = "You are a financial analyst assistant that provides helpful, accurate, and concise information based on financial data and earnings transcripts.";

//
// ================= Classification =================
//

/// Disambiguation text shown to the classifier for each intent
pub fn intent_description(intent: IntentType) -> &'static str {
    match intent {
        IntentType::TranscriptSummary => {
            "Provides an overall summary of a single company's earnings call or conference call."
        }
        IntentType::ExecutiveStatements => {
            "Extracts what specific, named executives said on a topic in earnings calls."
        }
        IntentType::FinancialDataQuery => {
            "Looks up specific financial figures (revenue, net income, ratios, margins, cash flow) for one company."
        }
        IntentType::MetricAnalysis => {
            "Analyzes a single metric for one company, either at a point in time or as a trend, combining the numbers with management commentary."
        }
        IntentType::TranscriptComparison => {
            "Compares how two or more companies discuss a topic in their earnings calls."
        }
        IntentType::MetricComparison => {
            "Compares financial figures across two or more companies."
        }
    }
}

pub fn classification_prompt(question: &str) -> String {
    let categories = IntentType::ALL
        .iter()
        .map(|intent| format!("  {}: {}", intent, intent_description(*intent)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a financial query analyzer specializing in earnings calls and financial metrics. Analyze the user's question and classify it into one or more of the following categories:
{}

A question may ask for several things at once (for example a figure and an executive's opinion). In that case return every matching category, most relevant first.

Provide:
1. The matching query types ranked by relevance (queryTypes)
2. A confidence score (0-1) for how clearly the question matches the first query type (confidenceScore)
3. A clarifying question if the confidence score is below 0.7 that would help determine the user's intent. If the score is 0.7 or above, leave it empty (clarifyQuestion)

User question: "{}""#,
        categories, question
    )
}

pub fn classification_schema() -> ResponseSchema {
    let intents: Vec<&str> = IntentType::ALL.iter().map(|i| i.as_str()).collect();

    ResponseSchema::new(
        CLASSIFICATION_SCHEMA,
        json!({
            "type": "object",
            "properties": {
                "queryTypes": {
                    "type": "array",
                    "items": { "type": "string", "enum": intents }
                },
                "confidenceScore": { "type": "number" },
                "clarifyQuestion": { "type": "string" }
            },
            "required": ["queryTypes", "confidenceScore", "clarifyQuestion"]
        }),
    )
}

//
// ================= Extraction =================
//

const TICKER_RULES: &str = r#"Company and ticker rules:
- Fill in a company or ticker only when it is explicitly named, or when it can be inferred with very high confidence from a named executive or a uniquely identifying description.
- Otherwise leave the field empty. Never guess."#;

fn time_rules(today: NaiveDate) -> String {
    let frames = TimeFrame::ALL
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"Time frame rules:
- Today's date is {}. Resolve relative expressions ("last quarter", "this year", "past 2 years") against it.
- timeFrame is one of: {}.
- Fill specificPeriod only with what the question states: quarter (1-4) and year for specific_quarter, year for specific_year, startDate and endDate (YYYY-MM-DD) for specific_date_range, count for past_n_quarters and past_n_years.
- Use not_specified when the question gives no time period."#,
        today.format("%Y-%m-%d"),
        frames
    )
}

fn metric_rules() -> String {
    let vocabulary = StatementCategory::ALL
        .iter()
        .map(|c| format!("- {}: {}", c, c.metrics().join(", ")))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Metric rules:
- Use only these metric names:
{}
- Map informal terms using this table:
{}
- Drop anything that is not a financial metric in the lists above. Never invent a metric name."#,
        vocabulary,
        vocabulary::synonym_guide()
    )
}

fn extraction_task(intent: IntentType) -> &'static str {
    match intent {
        IntentType::TranscriptSummary => {
            "Extract the details for this earnings call summary request. Identify the company name, the company's stock ticker symbol, and which earnings call to summarize."
        }
        IntentType::ExecutiveStatements => {
            "Extract details about executive statements from this query. Identify the executives mentioned, the companies they represent, those companies' stock ticker symbols, the topics of interest, and the relevant time period."
        }
        IntentType::FinancialDataQuery => {
            "Extract details for this financial data request. Identify the company, its stock ticker symbol, the metrics requested, whether a single value or a time series is wanted (dataType), and the time period referenced."
        }
        IntentType::MetricAnalysis => {
            "Extract details for this metric analysis request. Identify the company, its stock ticker symbol, the single metric to analyze, whether the question is about one point in time or a trend (analysisType), and the time period."
        }
        IntentType::TranscriptComparison => {
            "Extract details for this earnings call comparison request. Identify the companies being compared, their stock ticker symbols, the topic of comparison, and the relevant time period."
        }
        IntentType::MetricComparison => {
            "Extract details for this metric comparison request. Identify the companies being compared, their stock ticker symbols, the metrics to compare, and the relevant time period."
        }
    }
}

fn uses_metrics(intent: IntentType) -> bool {
    matches!(
        intent,
        IntentType::FinancialDataQuery | IntentType::MetricAnalysis | IntentType::MetricComparison
    )
}

pub fn extraction_prompt(intent: IntentType, question: &str, today: NaiveDate) -> String {
    let mut sections = vec![
        extraction_task(intent).to_string(),
        TICKER_RULES.to_string(),
        time_rules(today),
    ];
    if uses_metrics(intent) {
        sections.push(metric_rules());
    }
    sections.push(format!("User query: \"{}\"", question));

    sections.join("\n\n")
}

fn string_list() -> Value {
    json!({ "type": "array", "items": { "type": "string" } })
}

fn time_frame_property() -> Value {
    let frames: Vec<&str> = TimeFrame::ALL.iter().map(|f| f.as_str()).collect();
    json!({ "type": "string", "enum": frames })
}

fn specific_period_property() -> Value {
    json!({
        "type": "object",
        "nullable": true,
        "properties": {
            "quarter": { "type": "integer", "nullable": true },
            "year": { "type": "integer", "nullable": true },
            "startDate": { "type": "string", "nullable": true },
            "endDate": { "type": "string", "nullable": true },
            "count": { "type": "integer", "nullable": true }
        }
    })
}

fn object_schema(mut properties: serde_json::Map<String, Value>, required: &[&str]) -> Value {
    properties.insert("timeFrame".to_string(), time_frame_property());
    properties.insert("specificPeriod".to_string(), specific_period_property());

    let mut required: Vec<&str> = required.to_vec();
    required.push("timeFrame");

    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

fn properties(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

pub fn extraction_schema_name(intent: IntentType) -> &'static str {
    match intent {
        IntentType::TranscriptSummary => "transcript_summary",
        IntentType::ExecutiveStatements => "executive_statements",
        IntentType::FinancialDataQuery => "financial_data_query",
        IntentType::MetricAnalysis => "metric_analysis",
        IntentType::TranscriptComparison => "transcript_comparison",
        IntentType::MetricComparison => "metric_comparison",
    }
}

pub fn extraction_schema(intent: IntentType) -> ResponseSchema {
    let schema = match intent {
        IntentType::TranscriptSummary => object_schema(
            properties(json!({
                "company": { "type": "string" },
                "ticker": { "type": "string" }
            })),
            &["company", "ticker"],
        ),
        IntentType::ExecutiveStatements => object_schema(
            properties(json!({
                "executives": string_list(),
                "companies": string_list(),
                "tickers": string_list(),
                "topics": string_list()
            })),
            &["executives", "companies", "tickers", "topics"],
        ),
        IntentType::FinancialDataQuery => object_schema(
            properties(json!({
                "company": { "type": "string" },
                "ticker": { "type": "string" },
                "metrics": string_list(),
                "dataType": { "type": "string", "enum": ["single_value", "time_series"] }
            })),
            &["company", "ticker", "metrics", "dataType"],
        ),
        IntentType::MetricAnalysis => object_schema(
            properties(json!({
                "company": { "type": "string" },
                "ticker": { "type": "string" },
                "metric": { "type": "string" },
                "analysisType": { "type": "string", "enum": ["point_in_time", "trend"] }
            })),
            &["company", "ticker", "metric", "analysisType"],
        ),
        IntentType::TranscriptComparison => object_schema(
            properties(json!({
                "companies": string_list(),
                "tickers": string_list(),
                "comparisonTopic": { "type": "string" }
            })),
            &["companies", "tickers", "comparisonTopic"],
        ),
        IntentType::MetricComparison => object_schema(
            properties(json!({
                "companies": string_list(),
                "tickers": string_list(),
                "metrics": string_list()
            })),
            &["companies", "tickers", "metrics"],
        ),
    };

    ResponseSchema::new(extraction_schema_name(intent), schema)
}

//
// ================= Context Continuity =================
//

/// `"{role}: {content}"` per message, separated by blank lines
pub fn serialize_history(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn continuity_prompt(history: &[Message], question: &str) -> String {
    format!(
        r#"You are a financial context analyzer that directly answers follow-up questions when you already have the required financial context.

Given the conversation history and the latest question:

1. Identify the companies, tickers, financial entities and topics the latest question refers to.

2. Check whether the conversation history EXPLICITLY contains, for those specific entities:
   - Financial statement figures (income statement, balance sheet, cash flow)
   - Key metrics (revenue, profit, margins, etc.)
   - Financial ratios
   - Earnings call summaries
   - Detailed financial analysis

3. Rules:
   - isContinuation must be false if any data needed to answer is not already in the conversation history.
   - When unsure, answer false.
   - If isContinuation is true, response must be the complete answer to the latest question, using only data from the history.
   - Never respond with acknowledgments such as "I can do that" or "Certainly". Give the actual answer with the specific numbers.
   - If isContinuation is false, response must be empty.

4. Example:
   Question: "What was their revenue growth?"
   BAD: "Certainly, I can tell you about the revenue growth."
   GOOD: "Revenue grew by 23% year-over-year to $5.2B in Q4 2023, driven by..."

Previous conversation:
{}

Latest question: "{}""#,
        serialize_history(history),
        question
    )
}

pub fn continuity_schema() -> ResponseSchema {
    ResponseSchema::new(
        CONTINUITY_SCHEMA,
        json!({
            "type": "object",
            "properties": {
                "isContinuation": { "type": "boolean" },
                "response": { "type": "string" }
            },
            "required": ["isContinuation", "response"]
        }),
    )
}

//
// ================= Synthesis =================
//

pub const FORMATTING_INSTRUCTIONS: &str = r#"Formatting:
- Use markdown. Start sections with `###` headers.
- Present figures for more than one period or company in a markdown table.
- Bold the key numbers and conclusions.
- Format large numbers with units ($383.3B, $12.4M) and percentages with one decimal place.
- Only use figures present in the data below. If something is missing, say so."#;

fn join_or(items: &[String], fallback: &str) -> String {
    let present: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if present.is_empty() {
        fallback.to_string()
    } else {
        present.join(", ")
    }
}

/// Intent-specific instruction block with extracted parameters filled in
pub fn intent_instructions(params: &IntentParameters) -> String {
    match params {
        IntentParameters::TranscriptSummary(p) => format!(
            r#"Please provide a concise summary of {}'s ({}) earnings call transcript.

Focus on:
1. Key financial highlights
2. Major announcements
3. Strategic initiatives
4. Forward-looking statements
5. Any notable analyst questions and management responses

Be conversational but informative in your response."#,
            p.company, p.ticker
        ),
        IntentParameters::ExecutiveStatements(p) => format!(
            r#"Please extract and analyze statements made by {} from {} regarding {}.

Focus on:
1. Direct quotes from the executives on these topics
2. Context and implications of their statements
3. Any changes in sentiment or messaging over time
4. How these statements relate to company strategy or performance

Provide a conversational and informative summary of what these executives have said about these topics."#,
            join_or(&p.executives, "the company's executives"),
            join_or(&p.companies, &join_or(&p.tickers, "the company")),
            join_or(&p.topics, "the topics discussed")
        ),
        IntentParameters::FinancialDataQuery(p) => format!(
            r#"Please analyze the financial data for {} ({}) focusing on the metrics: {}.

Provide:
1. The specific values for these metrics
2. Context on what these values mean
3. Any trends or notable changes
4. Brief comparison to industry standards if available

Be conversational but precise with numbers and percentages."#,
            p.company,
            p.ticker,
            join_or(&p.metrics, "the key figures")
        ),
        IntentParameters::MetricAnalysis(p) => {
            let focus = match p.analysis_type {
                AnalysisType::PointInTime => {
                    "Focus on the specific value and context for this period."
                }
                AnalysisType::Trend => {
                    "Focus on the trend over time and how the narrative has evolved."
                }
            };
            format!(
                r#"Please analyze how {} ({}) discusses "{}" in their earnings calls and financial data.

{}

Include:
1. Actual metrics/numbers from the financial data
2. How executives discuss this metric
3. Any explanations for changes or performance
4. Implications for the company's strategy or outlook

Be conversational but factual in your analysis."#,
                p.company, p.ticker, p.metric, focus
            )
        }
        IntentParameters::TranscriptComparison(p) => format!(
            r#"Please compare how the companies {} discuss "{}" in their earnings calls.

Focus on:
1. Different approaches or emphasis each company places on this topic
2. Specific strategies mentioned by each company
3. How the messaging differs between competitors
4. Any notable quotes that highlight their distinct approaches

Provide a conversational but insightful comparison that highlights the key differences in how these companies talk about this topic."#,
            join_or(&p.companies, &join_or(&p.tickers, "in the data")),
            p.comparison_topic
        ),
        IntentParameters::MetricComparison(p) => format!(
            r#"Please compare the following metrics: {} across these companies: {}.

Include:
1. A direct comparison of the actual values
2. Relative performance analysis
3. Context on why there might be differences
4. Any trends that are visible across the companies

Be conversational but include specific numbers and percentages to make the comparison clear."#,
            join_or(&p.metrics, "the key figures"),
            join_or(&p.companies, &join_or(&p.tickers, "in the data"))
        ),
    }
}

/// Formatting contract, then the data, then the intent block
pub fn synthesis_prompt(params: &IntentParameters, data_json: &str) -> String {
    format!(
        "{}\n\nAnswer the user's question based on the following financial data:\n\n{}\n\n{}",
        FORMATTING_INSTRUCTIONS,
        data_json,
        intent_instructions(params)
    )
}

//
// ================= Portfolio =================
//

pub fn portfolio_system_prompt(portfolio_json: &str) -> String {
    format!(
        r#"You are a portfolio analyst helping an individual investor understand their holdings.

The investor's portfolio, with listing details and a computed summary, is below as JSON:
{}

Guidelines:
- Answer questions about holdings, sector allocation, concentration, risk and overall portfolio health.
- Use the numbers in the portfolio data. Do not invent prices or holdings.
- Explain risk measures such as beta and volatility in plain language.
- Be structured and concise, and use markdown tables when comparing holdings.
- Do not give personalised buy or sell instructions; frame suggestions as considerations."#,
        portfolio_json
    )
}
