//! Plain-text rendering of lesson views for the terminal.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use lesson_core::classifier::DocumentKind;
use lesson_core::quiz::OptionMark;
use services::ViewModel;
use services::lesson::{DocumentVm, NotesVm, QuizVm, VideoVm};

#[must_use]
pub fn render_text(view: &ViewModel) -> String {
    match view {
        ViewModel::Loading { chapter_title } => format!("Loading {chapter_title}...\n"),
        ViewModel::Unavailable(vm) => format!(
            "{}\nThis lesson is not available yet. Check back soon.\n",
            vm.chapter_title
        ),
        ViewModel::Quiz(vm) => render_quiz(vm),
        ViewModel::Video(vm) => render_video(vm),
        ViewModel::Document(vm) => render_document(vm),
        ViewModel::RichHtml(vm) => render_notes(vm, &html_to_text(&vm.body)),
        ViewModel::MarkdownNotes(vm) => render_notes(vm, &markdown_to_text(&vm.body)),
        ViewModel::Closed => "Lesson closed.\n".to_owned(),
    }
}

fn heading(out: &mut String, title: &str, subtitle: Option<&str>) {
    let _ = writeln!(out, "{title}");
    if let Some(subtitle) = subtitle {
        let _ = writeln!(out, "{subtitle}");
    }
    let _ = writeln!(out, "{}", "=".repeat(title.chars().count().max(3)));
}

fn render_quiz(vm: &QuizVm) -> String {
    let mut out = String::new();
    heading(&mut out, &vm.chapter_title, vm.subtitle.as_deref());

    for question in &vm.questions {
        let _ = writeln!(out, "\n{}. {}", question.number, question.prompt);
        for option in &question.options {
            let marker = match option.mark {
                Some(OptionMark::Correct) => "✓",
                Some(OptionMark::SelectedWrong) => "✗",
                Some(OptionMark::Neutral) | None => {
                    if question.selected == Some(option.index) {
                        ">"
                    } else {
                        " "
                    }
                }
            };
            let _ = writeln!(out, "  {marker} {}) {}", option.index + 1, option.text);
        }
        if let Some(explanation) = &question.explanation {
            let _ = writeln!(out, "  Explanation: {explanation}");
        }
    }

    if vm.finished {
        let _ = writeln!(out, "\nScore: {}/{}", vm.score, vm.total);
    } else {
        let _ = writeln!(out, "\nAnswered {}/{}", vm.answered, vm.total);
    }
    out
}

fn render_video(vm: &VideoVm) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Now playing: {}", vm.current.title);
    let _ = writeln!(out, "  {}", vm.current.url);
    if vm.show_picker {
        let _ = writeln!(out, "\nPlaylist:");
        for entry in &vm.entries {
            let marker = if entry.is_current { ">" } else { " " };
            let _ = writeln!(out, "  {marker} {}. {}", entry.index + 1, entry.title);
        }
    }
    if !vm.has_next {
        let _ = writeln!(out, "(last video)");
    }
    out
}

fn render_document(vm: &DocumentVm) -> String {
    let label = match vm.kind {
        DocumentKind::Embeddable => "Document",
        DocumentKind::ExternalLink => "Open in browser",
    };
    format!("{}\n{label}: {}\n", vm.chapter_title, vm.url)
}

fn render_notes(vm: &NotesVm, body: &str) -> String {
    let mut out = String::new();
    heading(&mut out, &vm.chapter_title, vm.subtitle.as_deref());
    out.push('\n');
    out.push_str(body);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Flatten markdown into readable plain text. Math is passed through as source.
#[must_use]
pub fn markdown_to_text(input: &str) -> String {
    use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_MATH);

    let mut out = String::new();
    for event in Parser::new_ext(input, options) {
        match event {
            Event::Start(Tag::Item) => out.push_str("• "),
            Event::Start(Tag::CodeBlock(_)) => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::TableRow
                | TagEnd::TableHead,
            ) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Event::End(TagEnd::TableCell) => out.push('\t'),
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::InlineMath(math) => {
                let _ = write!(out, "${math}$");
            }
            Event::DisplayMath(math) => {
                let _ = write!(out, "\n$${math}$$\n");
            }
            Event::SoftBreak | Event::HardBreak | Event::Rule => out.push('\n'),
            Event::TaskListMarker(done) => out.push_str(if done { "[x] " } else { "[ ] " }),
            _ => {}
        }
    }
    collapse_blank_lines(&out)
}

/// Sanitize lesson HTML, convert it to markdown, then flatten that.
#[must_use]
pub fn html_to_text(input: &str) -> String {
    let markdown = html2md::parse_html(&sanitize_html(input));
    markdown_to_text(&markdown)
}

fn sanitize_html(html: &str) -> String {
    let tags: HashSet<&str> = [
        "p", "div", "span", "br", "em", "strong", "b", "i", "code", "pre", "blockquote", "ul",
        "ol", "li", "a", "h1", "h2", "h3", "h4", "table", "thead", "tbody", "tr", "th", "td",
    ]
    .into_iter()
    .collect();

    let mut attributes: HashMap<&str, HashSet<&str>> = HashMap::new();
    attributes.insert("a", ["href"].into_iter().collect());

    ammonia::Builder::new()
        .tags(tags)
        .tag_attributes(attributes)
        .clean(html)
        .to_string()
}

fn collapse_blank_lines(input: &str) -> String {
    let mut lines = Vec::new();
    let mut blank_streak = 0usize;
    for line in input.lines() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            blank_streak += 1;
            if blank_streak > 1 {
                continue;
            }
        } else {
            blank_streak = 0;
        }
        lines.push(trimmed);
    }
    let mut output = lines.join("\n").trim().to_owned();
    if !output.is_empty() {
        output.push('\n');
    }
    output
}
