//! Prompt construction for OHLCV analysis
//!
//! Builds the system instruction and the user message sent to every
//! provider. The instruction table is fixed: four intents crossed with two
//! languages. The series itself is rendered as compact JSON-like text so
//! the model sees the numbers rather than a serialization format.

use crate::types::{AnalysisIntent, Language, PricePeriod};

/// Fixed instruction phrase for an (intent, language) pair
fn instruction(intent: AnalysisIntent, language: Language) -> &'static str {
    match language {
        Language::Cn => match intent {
            AnalysisIntent::Trend => "提供详细的趋势分析",
            AnalysisIntent::Volume => "分析成交量模式",
            AnalysisIntent::Technical => "进行技术分析",
            AnalysisIntent::Comprehensive => "提供全面分析",
        },
        Language::En => match intent {
            AnalysisIntent::Trend => "Provide a detailed trend analysis",
            AnalysisIntent::Volume => "Analyze the volume patterns",
            AnalysisIntent::Technical => "Perform technical analysis",
            AnalysisIntent::Comprehensive => "Provide a comprehensive analysis",
        },
    }
}

/// Build the system instruction for an analysis call
pub fn system_prompt(intent: AnalysisIntent, language: Language) -> String {
    let language_prompt = match language {
        Language::En => "Please respond in English only.",
        Language::Cn => "请使用中文回答。",
    };

    let mut prompt = String::new();
    prompt.push_str("You are a professional financial data analyst.\n");
    prompt.push_str("Analysis focus: ");
    prompt.push_str(instruction(intent, language));
    prompt.push('\n');
    prompt.push_str(language_prompt);
    prompt.push_str("\n\n");
    prompt.push_str("Please provide:\n");
    prompt.push_str("1. Clear and structured analysis\n");
    prompt.push_str("2. Key observations from the data\n");
    prompt.push_str("3. Potential implications or insights\n");
    prompt.push_str("4. Recommendations or considerations (if applicable)");
    prompt
}

/// Render the period series, with an optional trailing user question.
///
/// Prices are formatted to 2 decimal places and volume to 0; the question
/// paragraph is omitted entirely when the question is blank.
pub fn user_message(periods: &[PricePeriod], question: Option<&str>) -> String {
    let mut message = format!("Here is the OHLCV data ({} periods):\n[", periods.len());
    for (i, period) in periods.iter().enumerate() {
        if i > 0 {
            message.push(',');
        }
        message.push_str(&format!(
            "{{\"open\":{:.2},\"high\":{:.2},\"low\":{:.2},\"close\":{:.2},\"volume\":{:.0}}}",
            period.open, period.high, period.low, period.close, period.volume
        ));
    }
    message.push(']');

    if let Some(question) = question {
        let question = question.trim();
        if !question.is_empty() {
            message.push_str("\n\nMy specific question or request: ");
            message.push_str(question);
        }
    }

    message
}
