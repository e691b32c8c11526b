//! Prompt construction for the locator repair request

/// Task instructions sent ahead of the page data
pub const REPAIR_INSTRUCTIONS: &str = r##"You are a STRICT Selenium automation debugging agent.

Fix the broken locators of the Selenium script below using ONLY the real UI data
from the UI JSON (elements scraped from the live page).

RULES:
- Only fix broken locators: update IDs, names, classes or XPaths that are missing or incorrect.
- Do NOT invent elements or locators; use only elements present in the UI JSON.
- Keep all variable names, code structure, waits and comments intact. Do NOT rewrite the script.
- Add a comment "# FIX: <what you changed>" directly above or at the end of every changed line.
- Output valid, runnable Python code only, in a single ```python code block.
- No explanations outside Python comments."##;

/// Build the single user prompt for one repair attempt
pub fn build_prompt(url: &str, snapshot_json: &str, script: &str) -> String {
    format!(
        "{instructions}\n\n\
         Website URL: {url}\n\n\
         UI JSON:\n{snapshot}\n\n\
         Selenium Script:\n```python\n{script}\n```\n",
        instructions = REPAIR_INSTRUCTIONS,
        url = url,
        snapshot = snapshot_json,
        script = script.trim_end(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_all_inputs() {
        let prompt = build_prompt(
            "https://example.com/login",
            r#"[{"tag":"input","attributes":{"id":"user_email"}}]"#,
            "driver.find_element(By.ID, \"username-input\")\n",
        );

        assert!(prompt.starts_with(REPAIR_INSTRUCTIONS));
        assert!(prompt.contains("Website URL: https://example.com/login"));
        assert!(prompt.contains(r#""id":"user_email""#));
        assert!(prompt.contains("```python\ndriver.find_element(By.ID, \"username-input\")\n```"));
        assert!(prompt.contains("# FIX:"));
    }

    #[test]
    fn test_instructions_keep_every_rule() {
        assert!(REPAIR_INSTRUCTIONS.contains(r##""# FIX: <what you changed>""##));
        assert!(REPAIR_INSTRUCTIONS.ends_with("- No explanations outside Python comments."));
        assert_eq!(REPAIR_INSTRUCTIONS.matches("\n- ").count(), 6);
    }
}
