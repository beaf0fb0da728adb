use crate::graph::{node::GraphNode, through::Through};

pub trait NodeExt: GraphNode + Sized {
    fn through<F: GraphNode>(self, filter: F) -> Through<Self, F> {
        Through::new(self, filter)
    }

    /// Erase the concrete chain type.
    fn boxed(self) -> Box<dyn GraphNode>
    where
        Self: 'static,
    {
        Box::new(self)
    }
}

impl<T: GraphNode> NodeExt for T {}
