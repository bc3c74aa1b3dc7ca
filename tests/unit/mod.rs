mod algorithm;
mod io;
