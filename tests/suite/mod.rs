mod persistence;
mod rotation;
