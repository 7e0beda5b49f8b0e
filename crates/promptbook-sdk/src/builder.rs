//! Builder pattern for BookLibrary

use crate::config::{BookContent, SdkConfig};
use crate::error::{Result, SdkError};
use crate::library::BookLibrary;
use promptbook_compiler::{Compiler, CompilerOptions};
use std::path::PathBuf;
use tracing::{debug, info};

/// Builder for BookLibrary
///
/// # Example
///
/// ```rust,ignore
/// use promptbook_sdk::BookLibraryBuilder;
///
/// let library = BookLibraryBuilder::new()
///     .add_book_file("books/translation.book")
///     .add_book_content("greeting", "# Greeting\n\n## Greet\n\nSay hi\n\n-> {greeting}")
///     .build()?;
///
/// let pipeline = library.get("https://example.com/translation.book");
/// ```
#[derive(Debug, Clone, Default)]
pub struct BookLibraryBuilder {
    book_files: Vec<PathBuf>,
    book_contents: Vec<BookContent>,
    compiler_options: CompilerOptions,
}

impl BookLibraryBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the books and compiler options of a configuration
    pub fn from_config(config: &SdkConfig) -> Self {
        Self {
            book_files: config.book_files.clone(),
            book_contents: config.book_contents.clone(),
            compiler_options: config.compiler.clone(),
        }
    }

    /// Add a book file
    pub fn add_book_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.book_files.push(path.into());
        self
    }

    /// Add multiple book files
    pub fn add_book_files(mut self, paths: Vec<PathBuf>) -> Self {
        self.book_files.extend(paths);
        self
    }

    /// Add book content directly (alternative to file path)
    ///
    /// # Arguments
    /// * `name` - Name of the book used in error messages
    /// * `content` - Markdown source of the book
    pub fn add_book_content(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.book_contents.push(BookContent {
            name: name.into(),
            content: content.into(),
        });
        self
    }

    /// Set compiler options
    pub fn with_compiler_options(mut self, options: CompilerOptions) -> Self {
        self.compiler_options = options;
        self
    }

    /// Compile every book into a library
    ///
    /// Files are compiled first, then inline books. The first failing book
    /// aborts the build.
    pub fn build(self) -> Result<BookLibrary> {
        let compiler = Compiler::with_options(self.compiler_options);
        let mut library = BookLibrary::new();

        for path in &self.book_files {
            let content = std::fs::read_to_string(path).map_err(|source| SdkError::BookFileError {
                path: path.clone(),
                source,
            })?;

            let name = path.display().to_string();
            let pipeline = compiler
                .compile_source(&content, &name)
                .map_err(|source| SdkError::BookError {
                    name: name.clone(),
                    source,
                })?;

            debug!("Compiled book file {} into \"{}\"", name, pipeline.title);
            library.insert(pipeline)?;
        }

        for book in &self.book_contents {
            let pipeline = compiler
                .compile(&book.content)
                .map_err(|source| SdkError::BookError {
                    name: book.name.clone(),
                    source,
                })?;

            debug!("Compiled inline book {} into \"{}\"", book.name, pipeline.title);
            library.insert(pipeline)?;
        }

        info!("Book library ready with {} pipelines", library.len());
        Ok(library)
    }
}
