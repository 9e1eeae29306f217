pub mod graph_artifact;
