mod test_student_leaves_mid_negotiation;
