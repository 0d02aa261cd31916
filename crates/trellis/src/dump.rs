use std::io::{self, Write};

use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use crate::{
    error::{Error, Result},
    id::NodeId,
    tree::Tree,
};

/// Render the subtree under `root` with ANSI colour: one line per widget
/// with its name, flags and hidden state, plus its cached offset geometry.
/// This is a debug function.
pub fn dump(tree: &Tree, root: NodeId) -> Result<String> {
    render(tree, root, Buffer::ansi())
}

/// Like [`dump`], without colour codes.
pub fn dump_plain(tree: &Tree, root: NodeId) -> Result<String> {
    render(tree, root, Buffer::no_color())
}

/// Render into `buffer` and return the text.
fn render(tree: &Tree, root: NodeId, mut buffer: Buffer) -> Result<String> {
    if tree.node(root).is_none() {
        return Err(Error::NodeNotFound(root));
    }
    dump_node(&mut buffer, tree, root, 0).map_err(io_error)?;
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

/// Map a buffer write failure into the crate error.
fn io_error(e: io::Error) -> Error {
    Error::Internal(format!("dump: {e}"))
}

/// Write a coloured tag such as `attached`.
fn write_tag(buffer: &mut Buffer, tag: &str, color: Color) -> io::Result<()> {
    write!(buffer, " ")?;
    buffer.set_color(ColorSpec::new().set_fg(Some(color)))?;
    write!(buffer, "{tag}")?;
    buffer.reset()
}

/// Write one widget and, recursively, its subtree.
fn dump_node(buffer: &mut Buffer, tree: &Tree, id: NodeId, level: usize) -> io::Result<()> {
    let Some(node) = tree.node(id) else {
        return Ok(());
    };
    let indent = "    ".repeat(level);

    write!(buffer, "{indent}")?;
    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
    write!(buffer, "{}", node.name())?;
    buffer.reset()?;

    let flags = node.flags();
    if flags.is_attached() {
        write_tag(buffer, "attached", Color::Green)?;
    }
    if flags.is_visible() {
        write_tag(buffer, "visible", Color::Green)?;
    }
    if node.hidden() {
        write_tag(buffer, "(hidden)", Color::Yellow)?;
    }
    if flags.is_disposed() {
        write_tag(buffer, "disposed", Color::Red)?;
    }
    writeln!(buffer)?;

    if let Some(rect) = node.geometry().offset() {
        writeln!(
            buffer,
            "{indent}  offset: x: {}, y: {}, w: {}, h: {}",
            rect.tl.x, rect.tl.y, rect.w, rect.h
        )?;
    }

    for child in node.children() {
        dump_node(buffer, tree, *child, level + 1)?;
    }
    Ok(())
}
