use anyhow::Result;

/// Pass-through to the system clipboard. Carries no prompt logic.
pub struct ClipboardService {}

impl ClipboardService {
    pub fn set(text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(text.to_string())?;
        return Ok(());
    }
}
