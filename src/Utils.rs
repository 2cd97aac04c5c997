//! different utility modules used throughout the project
/// logger setup, elapsed time and saving of the step trace into csv
pub mod logger;
/// tiny module to plot the function and the Newton iterates into png
pub mod plots;
/// parse document with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4" into HashMap
pub mod task_parser;
