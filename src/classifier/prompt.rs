use std::fmt::Write;

use super::schema::{names, Category, ClassifiedQuery, Intent, Timeframe};
use crate::transactions::{range::DateRange, services::SpendingSummary};

fn joined<T: Copy>(all: &[T], as_str: fn(T) -> &'static str) -> String {
    names(all, as_str).join(", ")
}

pub fn classification_prompt(question: &str) -> String {
    format!(
        r#"You classify personal-finance questions. Reply with exactly one JSON object and nothing else: no markdown, no code fences, no explanation.

The object has exactly these keys:
- "intent": one of {intents}
- "category": one of {categories}
- "timeframe": one of {timeframes}
- "amount": a number if the question mentions a money amount, otherwise null

Use "etc" when the question is about spending that is not food, entertainment or bills. Use "month" when no timeframe is mentioned.

Examples:
Question: How much did I spend on food this month?
{{"intent":"spendingQuery","category":"food","timeframe":"month","amount":null}}
Question: Can I afford a $200 concert ticket this week?
{{"intent":"budgetAdvice","category":"entertainment","timeframe":"week","amount":200}}
Question: Am I on track to save 5000 this year if I cut travel?
{{"intent":"goalTracking","category":"etc","timeframe":"year","amount":5000}}

Question: {question}"#,
        intents = joined(&Intent::ALL, Intent::as_str),
        categories = joined(&Category::ALL, Category::as_str),
        timeframes = joined(&Timeframe::ALL, Timeframe::as_str),
        question = question.trim(),
    )
}

fn intent_instruction(intent: Intent) -> &'static str {
    match intent {
        Intent::SpendingQuery => "State how much the user spent and put it in context.",
        Intent::BudgetAdvice => {
            "Give one concrete, practical budgeting suggestion based on the spending above."
        }
        Intent::GoalTracking => {
            "Say whether the user looks on track for their goal and what would help them get there."
        }
    }
}

fn timeframe_phrase(timeframe: Timeframe) -> &'static str {
    match timeframe {
        Timeframe::Week => "this week",
        Timeframe::Month => "this month",
        Timeframe::Year => "this year",
    }
}

pub fn answer_prompt(
    question: &str,
    query: &ClassifiedQuery,
    range: DateRange,
    summary: &SpendingSummary,
) -> String {
    let mut facts = String::new();
    let _ = writeln!(
        facts,
        "- Period: {} ({} to {}, end exclusive)",
        timeframe_phrase(query.timeframe),
        range.start.date(),
        range.end.date()
    );
    let _ = writeln!(facts, "- Category: {}", query.category);
    let _ = writeln!(
        facts,
        "- Total: {:.2} across {} transaction(s)",
        summary.total, summary.transaction_count
    );
    for label in &summary.by_label {
        let _ = writeln!(
            facts,
            "  - {}: {:.2} ({} transaction(s))",
            label.label, label.total, label.count
        );
    }
    if let Some(amount) = query.amount {
        let _ = writeln!(facts, "- Amount mentioned by the user: {:.2}", amount);
    }

    format!(
        "You are a friendly personal-finance assistant.\n\
         The user asked: \"{question}\"\n\n\
         Facts from their transactions:\n{facts}\n\
         {instruction}\n\
         Answer in 2 to 3 short plain-language sentences. Do not use markdown, lists or headings. \
         Only use the numbers given above.",
        question = question.trim(),
        facts = facts,
        instruction = intent_instruction(query.intent),
    )
}
