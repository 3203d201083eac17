// Text preprocessing: turns raw review text into vocabulary-ready tokens.

pub mod normalize;
