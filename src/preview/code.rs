// src/preview/code.rs
use super::*;

pub struct CodePreview {
    max_lines: usize,
    max_width: usize,
}

impl CodePreview {
    pub fn new() -> Self {
        CodePreview { max_lines: 300, max_width: 200 }
    }

    fn detect_language(ext: &str) -> &'static str {
        match ext {
            "rs" => "rust",
            "py" => "python",
            "js" | "mjs" | "jsx" => "javascript",
            "ts" | "tsx" => "typescript",
            "go" => "go",
            "java" => "java",
            "c" | "h" => "c",
            "cpp" | "hpp" | "cc" => "cpp",
            "rb" => "ruby",
            "php" => "php",
            "css" => "css",
            "html" | "htm" => "html",
            _ => "plaintext",
        }
    }
}

impl PreviewProvider for CodePreview {
    fn can_preview(&self, source: &PreviewSource) -> bool {
        let code_extensions = ["rs", "py", "js", "mjs", "jsx", "ts", "tsx", "java", "c", "cpp", "cc", "h", "hpp", "go", "rb", "php", "css", "html", "htm", "sh", "sql"];
        code_extensions.contains(&source.extension().as_str())
    }

    fn generate_preview(&self, source: &PreviewSource) -> crate::Result<PreviewContent> {
        let content = String::from_utf8_lossy(source.bytes);
        let language = Self::detect_language(&source.extension());
        let body = truncate_lines(&content, self.max_lines, self.max_width);
        Ok(PreviewContent::Text(format!("── {} ──\n{}", language, body)))
    }
}
