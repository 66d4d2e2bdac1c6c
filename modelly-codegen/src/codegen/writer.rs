//! Indentation-aware text buffer for emitting C# and TypeScript sources

/// Builds source text line by line with a fixed indentation unit.
///
/// ```
/// use modelly_codegen::codegen::CodeWriter;
///
/// let mut w = CodeWriter::csharp();
/// w.block("public class Users", |w| {
///     w.line("public int Id { get; set; }");
/// });
/// assert_eq!(w.build(), "public class Users\n{\n    public int Id { get; set; }\n}\n");
/// ```
#[derive(Debug, Clone)]
pub struct CodeWriter {
    indent_level: usize,
    indent: &'static str,
    /// Brace placement: own line (C#) or end of header (TypeScript)
    allman: bool,
    buffer: String,
}

impl CodeWriter {
    /// 4-space indentation, braces on their own line
    pub fn csharp() -> Self {
        Self {
            indent_level: 0,
            indent: "    ",
            allman: true,
            buffer: String::new(),
        }
    }

    /// 2-space indentation, opening brace on the header line
    pub fn typescript() -> Self {
        Self {
            indent_level: 0,
            indent: "  ",
            allman: false,
            buffer: String::new(),
        }
    }

    /// Add a line with the current indentation
    pub fn line(&mut self, s: impl AsRef<str>) -> &mut Self {
        let s = s.as_ref();
        if s.is_empty() {
            return self.blank();
        }
        for _ in 0..self.indent_level {
            self.buffer.push_str(self.indent);
        }
        self.buffer.push_str(s);
        self.buffer.push('\n');
        self
    }

    /// Add several lines at the current indentation
    pub fn lines<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for l in lines {
            self.line(l);
        }
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self
    }

    pub fn indent(&mut self) -> &mut Self {
        self.indent_level += 1;
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        self.indent_level = self.indent_level.saturating_sub(1);
        self
    }

    /// `header { body }` in the writer's brace style
    pub fn block<F>(&mut self, header: impl AsRef<str>, f: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        self.block_with_close(header, "}", f)
    }

    /// Like [`block`](Self::block) but with a custom closing line (e.g. `});`)
    pub fn block_with_close<F>(&mut self, header: impl AsRef<str>, close: &str, f: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        let header = header.as_ref();
        if self.allman {
            self.line(header);
            self.line("{");
        } else {
            self.line(format!("{} {{", header));
        }
        self.indent();
        f(self);
        self.dedent();
        self.line(close)
    }

    /// `/// <summary>` doc comment
    pub fn summary(&mut self, text: &str) -> &mut Self {
        self.line("/// <summary>");
        self.line(format!("/// {}", text));
        self.line("/// </summary>")
    }

    pub fn build(self) -> String {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csharp_block() {
        let mut w = CodeWriter::csharp();
        w.block("namespace Contoso", |w| {
            w.block("public class A", |w| {
                w.line("int x;").blank().line("int y;");
            });
        });
        assert_eq!(
            w.build(),
            "namespace Contoso\n{\n    public class A\n    {\n        int x;\n\n        int y;\n    }\n}\n"
        );
    }

    #[test]
    fn test_typescript_block_with_close() {
        let mut w = CodeWriter::typescript();
        w.block_with_close("describe('X', () =>", "});", |w| {
            w.block("it('works', () =>", |w| {
                w.line("expect(1).toBe(1);");
            });
        });
        assert_eq!(
            w.build(),
            "describe('X', () => {\n  it('works', () => {\n    expect(1).toBe(1);\n  }\n});\n"
        );
    }

    #[test]
    fn test_dedent_saturates() {
        let mut w = CodeWriter::typescript();
        w.dedent().dedent().line("x");
        assert_eq!(w.build(), "x\n");
    }

    #[test]
    fn test_summary() {
        let mut w = CodeWriter::csharp();
        w.indent().summary("Gets a row");
        assert_eq!(
            w.build(),
            "    /// <summary>\n    /// Gets a row\n    /// </summary>\n"
        );
    }
}
