pub mod ask_panel;
pub mod details_panel;
pub mod petri_graph;
