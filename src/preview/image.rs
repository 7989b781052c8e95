// src/preview/image.rs
use super::*;
use std::io::Write;
use std::process::{Command, Stdio};

pub struct ImagePreview {
    width: u32,
    height: u32,
}

impl ImagePreview {
    pub fn new() -> Self {
        ImagePreview { width: 80, height: 40 }
    }

    fn render_with_chafa(&self, bytes: &[u8]) -> Option<String> {
        which::which("chafa").ok()?;
        let size = format!("{}x{}", self.width, self.height);
        let mut child = Command::new("chafa")
            .args(["--size", &size, "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .ok()?;
        child.stdin.take()?.write_all(bytes).ok()?;
        let output = child.wait_with_output().ok()?;
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl PreviewProvider for ImagePreview {
    fn can_preview(&self, source: &PreviewSource) -> bool {
        source.content_type.starts_with("image/")
            || FileCategory::from_extension(&source.extension()) == FileCategory::Image
    }

    fn generate_preview(&self, source: &PreviewSource) -> crate::Result<PreviewContent> {
        if let Some(ascii) = self.render_with_chafa(source.bytes) {
            return Ok(PreviewContent::Text(ascii));
        }
        Ok(PreviewContent::Text(format!(
            "[Image {}, {}: install chafa for ASCII preview]",
            source.content_type,
            format_size(source.bytes.len() as u64)
        )))
    }
}
