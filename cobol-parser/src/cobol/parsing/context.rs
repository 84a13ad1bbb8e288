//! Parse context: the stack of frames the engine builds the tree on.
//!
//! Each frame holds one node under construction and the grammar rule active while building it.
//! Productions push a frame, append children to [`ParseContext::current`], and close it with
//! [`ParseContext::pop_and_attach`], which is how the tree grows bottom-up as nested productions
//! return. The root frame sits below the stack and cannot be popped; [`ParseContext::finish`]
//! hands it over once the outermost production is done, so the stack is never empty while a
//! production runs.

use crate::cobol::ast::Node;
use crate::cobol::lexing::GrammarRule;

#[derive(Debug)]
struct Frame {
    node: Node,
    rule: GrammarRule,
}

impl Frame {
    fn new(node: Node) -> Self {
        let rule = node.kind.rule();
        Self { node, rule }
    }
}

#[derive(Debug)]
pub struct ParseContext {
    root: Frame,
    frames: Vec<Frame>,
}

impl ParseContext {
    pub fn new(root: Node) -> Self {
        Self {
            root: Frame::new(root),
            frames: Vec::new(),
        }
    }

    /// Start a new frame; it becomes current.
    pub fn push(&mut self, node: Node) {
        self.frames.push(Frame::new(node));
    }

    /// Remove the current frame and return its node without attaching it anywhere.
    /// Returns `None` when only the root frame is left.
    pub fn pop(&mut self) -> Option<Node> {
        self.frames.pop().map(|frame| frame.node)
    }

    /// Remove the current frame and append its node as the last child of the new current frame.
    pub fn pop_and_attach(&mut self) {
        if let Some(frame) = self.frames.pop() {
            self.current().push_node(frame.node);
        }
    }

    /// The node of the top frame, mutated in place by appending further children.
    pub fn current(&mut self) -> &mut Node {
        match self.frames.last_mut() {
            Some(frame) => &mut frame.node,
            None => &mut self.root.node,
        }
    }

    /// Rule of the top frame.
    pub fn rule(&self) -> GrammarRule {
        self.frames.last().unwrap_or(&self.root).rule
    }

    /// Number of frames, the root included.
    pub fn depth(&self) -> usize {
        self.frames.len() + 1
    }

    /// Close any frames still open and yield the root.
    pub fn finish(mut self) -> Node {
        while !self.frames.is_empty() {
            self.pop_and_attach();
        }
        self.root.node
    }
}
