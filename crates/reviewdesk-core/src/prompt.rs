//! The fixed prompt sent to the language model.

use std::fmt::Write;

use crate::documents::ReviewDocument;

pub const PRODUCT_NAME: &str = "TaskFlow Pro";

/// Reply for an empty question. No backend is called in that case.
pub const EMPTY_QUESTION_REPLY: &str = "Please ask a question about TaskFlow Pro.";

/// Fills the fixed template with the retrieved reviews and the question.
pub fn render_prompt(reviews: &[ReviewDocument], question: &str) -> String {
    let reviews = format_reviews(reviews);
    format!(
        "
You are a helpful assistant analyzing customer reviews for {PRODUCT_NAME}, a project management SaaS tool.

Here are some relevant customer reviews: {reviews}

Here is the question to answer: {question}

Provide a clear and helpful answer based on what customers are saying in the reviews.
If relevant, mention specific details like ratings, user roles, or company sizes.
"
    )
}

/// Numbered list of reviews: content line, then a metadata line.
pub fn format_reviews(reviews: &[ReviewDocument]) -> String {
    if reviews.is_empty() {
        return "(no matching reviews)".to_string();
    }
    let mut out = String::new();
    for (i, doc) in reviews.iter().enumerate() {
        let m = &doc.metadata;
        let _ = write!(
            out,
            "\n[{}] {}\n    rating: {} | date: {} | reviewer: {} | role: {} | company size: {} | sentiment: {}",
            i + 1,
            doc.content,
            m.rating,
            m.date,
            m.reviewer,
            m.role,
            m.company_size,
            m.sentiment,
        );
    }
    out.push('\n');
    out
}
