//! Text templates emitted into every generated post.
//!
//! Centralising the templates here serves two purposes:
//!
//! 1. **Single source of truth**: the Jekyll theme expects a specific
//!    front-matter shape and container markup; changing either requires
//!    editing exactly one place.
//!
//! 2. **Testability**: unit tests can import the templates directly and
//!    assert on the exact bytes the site build will see.
//!
//! The category, tags and description placeholders can be overridden through
//! [`crate::config::ConversionConfig`]; the defaults below match the
//! placeholders the blog already uses.

/// Default `categories:` entry.
pub const DEFAULT_CATEGORY: &str = "论文笔记";

/// Default `tags:` entry, a reminder to set real tags.
pub const DEFAULT_TAG: &str = "待设置";

/// Default `description:` entry.
pub const DEFAULT_DESCRIPTION: &str = "待添加文章描述";

/// Heading that introduces the note's metadata section.
pub const META_DATA_HEADING: &str = "### Meta Data";

/// Horizontal rule that closes the metadata section.
pub const META_DATA_END: &str = "***";

/// HTML comment inserted before the end of the metadata section, telling the
/// author how to embed the paper PDF.
pub const PDF_REMINDER: &str = r#"<!--
要嵌入PDF，请在Meta Data部分后添加以下代码：
{% include pdf_embed.html file="path/to/your/paper.pdf" id="unique-id" %}
-->
"#;

/// Closing tag for the container opened by the front matter.
pub const CONTAINER_CLOSE: &str = "</div>";

/// Follow-up checklist printed after a successful conversion.
pub const CHECKLIST: &[&str] = &[
    "Set suitable tags in the front matter",
    "Add a post description",
    "Embed the paper PDF if needed (see the comment in the file)",
    "Review the formatting and content",
    "Check that rewritten or copied images display correctly",
];

/// Render the Jekyll front matter and the opening container markup.
///
/// The returned string ends with a newline; the post body follows directly.
pub fn front_matter(
    title: &str,
    date: &str,
    category: &str,
    tags: &[String],
    description: &str,
) -> String {
    format!(
        "---\n\
         title: {title}\n\
         date: {date}\n\
         categories: [{category}]\n\
         tags: [{tags}]\n\
         description: {description}\n\
         ---\n\
         \n\
         {{% include paper_note_style.html %}}\n\
         \n\
         <div class=\"paper-note-container\" markdown=\"1\">\n",
        tags = tags.join(", "),
    )
}
