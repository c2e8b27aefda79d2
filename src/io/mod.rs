//! Graph file loading and writing
//!
//! A graph file holds one node or edge per line:
//!
//! ```text
//! # comment
//! NODE_SE2 0 0 0 0
//! PARAM_BIAS 1 0.1 0 0
//! CONSTRAINT_POSES2D_SE2_BIAS 0 2 1 1 0 0 1 0 0 1 0 1
//! ```
//!
//! Node lines are `TAG id record`, edge lines `TAG id_1 .. id_k record`
//! where `k` is the number of endpoints of the edge type. The record layout
//! belongs to the type (see [`record`]). Which types exist, and what their
//! records look like, depends on the [`Schema`](crate::core::registry::Schema)
//! in the [`GraphConfig`].
//!
//! Edges may appear before the nodes they connect; they are attached once
//! every line has been read.

pub mod record;

use crate::core::{
    NodeId,
    graph::{Graph, GraphConfig},
    registry::TypeRegistry,
};
use record::{RecordReader, RecordWriter};
use std::io;
use thiserror::Error;
use tracing::{debug, error, warn};

#[cfg(feature = "io")]
use std::{fs::File, io::Write, path::Path};

/// Errors that can occur while reading records and graph files
#[derive(Error, Debug)]
pub enum IoError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Duplicate node ID: {id}")]
    DuplicateNode { id: usize },

    #[error("Record ended before field '{field}'")]
    Truncated { field: &'static str },

    #[error("Invalid number for field '{field}': {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid integer for field '{field}': {value}")]
    InvalidInteger { field: &'static str, value: String },
}

impl IoError {
    /// Log the error using tracing::error and return self for chaining
    #[must_use]
    pub fn log(self) -> Self {
        error!("{}", self);
        self
    }

    /// Log the error with source error information using tracing::error and return self for chaining
    #[must_use]
    pub fn log_with_source<E: std::fmt::Debug>(self, source_error: E) -> Self {
        error!("{} | Source: {:?}", self, source_error);
        self
    }
}

fn parse_error(line: usize, tag: &str, message: impl std::fmt::Display) -> IoError {
    IoError::Parse {
        line,
        message: format!("{tag}: {message}"),
    }
}

/// Build a graph from graph-file text.
pub fn parse_graph(content: &str, config: &GraphConfig) -> Result<Graph, IoError> {
    let registry = TypeRegistry::new(config.schema);
    let mut graph = Graph::new(config.clone());
    let mut pending_edges = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_num = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut reader = RecordReader::new(line);
        let tag = reader.read_token("tag")?;

        if let Some(mut node) = registry.create_node(tag) {
            let id = reader
                .read_usize("id")
                .map_err(|e| parse_error(line_num, tag, e).log())?;
            node.as_vertex_mut()
                .read(&mut reader)
                .map_err(|e| parse_error(line_num, tag, e).log())?;
            warn_trailing(reader, line_num, tag);

            graph
                .add_node(NodeId(id), node)
                .map_err(|e| IoError::DuplicateNode { id }.log_with_source(e))?;
        } else if let Some(mut edge) = registry.create_edge(tag) {
            let arity = edge.vertex_kinds().len();
            let mut vertices = Vec::with_capacity(arity);
            for _ in 0..arity {
                let id = reader
                    .read_usize("id")
                    .map_err(|e| parse_error(line_num, tag, e).log())?;
                vertices.push(NodeId(id));
            }
            edge.set_vertices(&vertices)
                .map_err(|e| parse_error(line_num, tag, e).log())?;
            edge.read(&mut reader)
                .map_err(|e| parse_error(line_num, tag, e).log())?;
            warn_trailing(reader, line_num, tag);

            pending_edges.push((line_num, edge));
        } else if config.skip_unknown {
            warn!("line {}: skipping unknown type {}", line_num, tag);
        } else {
            return Err(IoError::UnsupportedType(tag.to_string())
                .log_with_source(format!("line {line_num}")));
        }
    }

    for (line_num, edge) in pending_edges {
        let tag = edge.tag();
        graph
            .add_edge(edge)
            .map_err(|e| parse_error(line_num, tag, e).log())?;
    }

    debug!(
        "parsed graph with {} nodes and {} edges ({} schema)",
        graph.nodes().len(),
        graph.edges().len(),
        config.schema
    );
    Ok(graph)
}

fn warn_trailing(reader: RecordReader<'_>, line_num: usize, tag: &str) {
    let remaining = reader.remaining();
    if !remaining.is_empty() {
        warn!(
            "line {}: {} ignoring {} trailing token(s) {:?}",
            line_num,
            tag,
            remaining.len(),
            remaining
        );
    }
}

/// Write a graph as graph-file text: nodes in id order, then edges in
/// insertion order.
pub fn write_graph(graph: &Graph) -> String {
    let mut out = String::new();
    for (id, node) in graph.nodes().iter() {
        let vertex = node.as_vertex();
        let mut writer = RecordWriter::new();
        writer.write_token(vertex.tag()).write_usize(id.0);
        vertex.write(&mut writer);
        out.push_str(writer.as_str());
        out.push('\n');
    }
    for edge in graph.edges() {
        let mut writer = RecordWriter::new();
        writer.write_token(edge.tag());
        for id in edge.vertices() {
            writer.write_usize(id.0);
        }
        edge.write(&mut writer);
        out.push_str(writer.as_str());
        out.push('\n');
    }
    out
}

/// Load a graph file through a memory map.
#[cfg(feature = "io")]
pub fn load_graph<P: AsRef<Path>>(path: P, config: &GraphConfig) -> Result<Graph, IoError> {
    let path_ref = path.as_ref();
    let file = File::open(path_ref).map_err(|e| {
        IoError::Io(e).log_with_source(format!("Failed to open graph file: {:?}", path_ref))
    })?;
    let mmap = unsafe {
        memmap2::Mmap::map(&file).map_err(|e| {
            IoError::Io(e)
                .log_with_source(format!("Failed to memory-map graph file: {:?}", path_ref))
        })?
    };
    let content = std::str::from_utf8(&mmap).map_err(|e| {
        IoError::Parse {
            line: 0,
            message: format!("Invalid UTF-8: {e}"),
        }
        .log()
    })?;

    parse_graph(content, config)
}

/// Write a graph file with a short comment header.
#[cfg(feature = "io")]
pub fn save_graph<P: AsRef<Path>>(graph: &Graph, path: P) -> Result<(), IoError> {
    let path_ref = path.as_ref();
    let mut file = File::create(path_ref).map_err(|e| {
        IoError::Io(e).log_with_source(format!("Failed to create graph file: {:?}", path_ref))
    })?;

    writeln!(file, "# Calibration graph written by sclam2d")
        .map_err(|e| IoError::Io(e).log_with_source("Failed to write header"))?;
    writeln!(
        file,
        "# Timestamp: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )
    .map_err(|e| IoError::Io(e).log_with_source("Failed to write timestamp"))?;
    writeln!(
        file,
        "# Schema: {}, nodes: {}, edges: {}",
        graph.config().schema,
        graph.nodes().len(),
        graph.edges().len()
    )
    .map_err(|e| IoError::Io(e).log_with_source("Failed to write statistics"))?;

    file.write_all(write_graph(graph).as_bytes())
        .map_err(|e| IoError::Io(e).log_with_source("Failed to write graph body"))?;
    Ok(())
}
