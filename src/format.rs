//! Rendering of generation results and the output character budget

use serde_json::json;
use log::debug;

/// Render a result for the caller. Markdown gets a footer naming the
/// model and, when reported, the token usage.
pub fn render(
  result: &crate::NormalizedResult
, format: crate::OutputFormat
) -> String
{   match format
    {   crate::OutputFormat::Markdown => {
          let mut footer = format!("**Model:** {}", result.model_used);
          if let Some(usage) = &result.usage
          {   footer.push_str(&format!(
                " | **Tokens:** {} input, {} output, {} total",
                usage.input_tokens,
                usage.output_tokens,
                usage.total_tokens
              ));
          }
          if let Some(count) = result.message_count
          {   footer.push_str(&format!(" | **Messages:** {}", count));
          }
          format!("{}\n\n---\n{}", result.text, footer)
        }
      , crate::OutputFormat::Json => {
          let mut value = json!({
            "model": result.model_used,
            "text": result.text,
          });
          if let Some(usage) = &result.usage
          {   value["usage"] = json!(usage);
          }
          if let Some(count) = result.message_count
          {   value["message_count"] = json!(count);
          }
          serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| value.to_string())
        }
    }
}

/// Notice appended to truncated output
pub fn truncation_notice(original: usize, limit: usize) -> String
{   format!(
      "\n\n[Response truncated: {} characters exceeded the {} \
       character limit. Use max_output_tokens to limit generation \
       length.]",
      original, limit
    )
}

/// Cap `text` at `limit` characters. Cuts at a character boundary with
/// no regard for words or structure, so truncated JSON stops being
/// valid JSON.
pub fn truncate(text: &str, limit: usize) -> (String, bool)
{   let original = text.chars().count();
    if original <= limit
    {   return (text.to_string(), false);
    }
    debug!("Truncating output from {} to {} chars", original, limit);
    let mut cut: String = text.chars().take(limit).collect();
    cut.push_str(&truncation_notice(original, limit));
    (cut, true)
}
