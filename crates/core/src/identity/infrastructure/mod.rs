pub mod mean_difference_matcher;
