pub mod bitmap_font;
pub mod match_box_annotator;
